//! MiniMax voice provider.
//!
//! Talks to the MiniMax HTTP API (`/v1/get_voice`, `/v1/delete_voice`,
//! `/v1/files/upload`, `/v1/voice_clone`, `/v1/t2a_v2`). Every response carries a
//! `base_resp` block; a non-zero `status_code` is surfaced as
//! [`ProviderError::Api`]. Requests are never retried.

use super::error::{ConnectionError, ProviderError};
use super::interface::{
    parse_created_time, CloneOptions, SynthesisParams, VoiceCatalogEntry, VoiceProvider,
};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub struct MiniMaxClient {
    client: Client,
    api_key: String,
    group_id: String,
    base_url: String,
}

// ── Wire Types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BaseResp {
    status_code: i64,
    #[serde(default)]
    status_msg: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    base_resp: Option<BaseResp>,
    #[serde(flatten)]
    body: T,
}

/// Descriptions come back as a list, occasionally as a bare string or null.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum Description {
    Many(Vec<String>),
    One(String),
    #[default]
    Missing,
}

impl Description {
    fn into_vec(self) -> Vec<String> {
        match self {
            Description::Many(v) => v,
            Description::One(s) if s.is_empty() => Vec::new(),
            Description::One(s) => vec![s],
            Description::Missing => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClonedVoiceInfo {
    voice_id: String,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default)]
    created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SystemVoiceInfo {
    voice_id: String,
    #[serde(default)]
    voice_name: Option<String>,
    #[serde(default)]
    description: Option<Description>,
}

#[derive(Debug, Deserialize)]
struct GetVoiceBody {
    #[serde(default)]
    voice_cloning: Option<Vec<ClonedVoiceInfo>>,
    #[serde(default)]
    system_voice: Option<Vec<SystemVoiceInfo>>,
}

#[derive(Serialize)]
struct GetVoiceRequest<'a> {
    voice_type: &'a str,
}

#[derive(Serialize)]
struct DeleteVoiceRequest<'a> {
    voice_type: &'a str,
    voice_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    file_id: i64,
}

#[derive(Debug, Deserialize)]
struct UploadBody {
    file: Option<UploadedFile>,
}

#[derive(Serialize)]
struct CloneRequest<'a> {
    file_id: i64,
    voice_id: &'a str,
    need_noise_reduction: bool,
    need_volume_normalization: bool,
    accuracy: f32,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct VoiceSetting<'a> {
    voice_id: &'a str,
    speed: f32,
    vol: f32,
    pitch: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion: Option<&'a str>,
}

#[derive(Serialize)]
struct AudioSetting {
    sample_rate: u32,
    bitrate: u32,
    format: &'static str,
    channel: u8,
}

#[derive(Serialize)]
struct T2aRequest<'a> {
    model: &'a str,
    text: &'a str,
    stream: bool,
    voice_setting: VoiceSetting<'a>,
    audio_setting: AudioSetting,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_boost: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct T2aAudio {
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct T2aBody {
    data: Option<T2aAudio>,
}

// ── Client ─────────────────────────────────────────────

impl MiniMaxClient {
    /// Build a client. Only checks that credentials are present; nothing is
    /// sent to the provider until the first call.
    pub fn new(
        api_key: &str,
        group_id: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectionError::Client(e.to_string()))?;
        Self::with_http_client(client, api_key, group_id, base_url)
    }

    /// Build on top of an existing HTTP client.
    pub fn with_http_client(
        client: Client,
        api_key: &str,
        group_id: &str,
        base_url: &str,
    ) -> Result<Self, ConnectionError> {
        if api_key.trim().is_empty() || group_id.trim().is_empty() {
            return Err(ConnectionError::MissingCredentials);
        }
        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            group_id: group_id.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// POST a JSON body and unwrap the `base_resp` envelope.
    async fn post_json<B, T>(&self, path: &str, with_group: bool, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.authorized(self.client.post(self.url(path)));
        if with_group {
            request = request.query(&[("GroupId", self.group_id.as_str())]);
        }
        let response = request.json(body).send().await?;
        self.read_envelope(response).await
    }

    async fn read_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;
        match envelope.base_resp {
            Some(base) if base.status_code == 0 => Ok(envelope.body),
            Some(base) => Err(ProviderError::Api {
                code: base.status_code,
                message: base.status_msg,
            }),
            None => Err(ProviderError::Decode("response has no base_resp".into())),
        }
    }
}

#[async_trait]
impl VoiceProvider for MiniMaxClient {
    fn id(&self) -> String {
        "minimax".to_string()
    }

    async fn list_cloned_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError> {
        let body: GetVoiceBody = self
            .post_json(
                "/v1/get_voice",
                false,
                &GetVoiceRequest {
                    voice_type: "voice_cloning",
                },
            )
            .await?;
        Ok(body
            .voice_cloning
            .unwrap_or_default()
            .into_iter()
            .map(|v| {
                VoiceCatalogEntry::cloned(
                    v.voice_id,
                    v.description.unwrap_or_default().into_vec(),
                    v.created_time.as_deref().and_then(parse_created_time),
                )
            })
            .collect())
    }

    async fn list_system_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError> {
        let body: GetVoiceBody = self
            .post_json("/v1/get_voice", false, &GetVoiceRequest { voice_type: "system" })
            .await?;
        Ok(body
            .system_voice
            .unwrap_or_default()
            .into_iter()
            .map(|v| {
                VoiceCatalogEntry::remote_system(
                    v.voice_id,
                    v.voice_name,
                    v.description.unwrap_or_default().into_vec(),
                )
            })
            .collect())
    }

    async fn delete_voice(&self, voice_id: &str) -> Result<(), ProviderError> {
        let _: Empty = self
            .post_json(
                "/v1/delete_voice",
                false,
                &DeleteVoiceRequest {
                    voice_type: "voice_cloning",
                    voice_id,
                },
            )
            .await?;
        Ok(())
    }

    async fn upload_file(&self, path: &Path) -> Result<i64, ProviderError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.bin".to_string());

        let form = multipart::Form::new()
            .text("purpose", "voice_clone")
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .authorized(self.client.post(self.url("/v1/files/upload")))
            .query(&[("GroupId", self.group_id.as_str())])
            .multipart(form)
            .send()
            .await?;

        let body: UploadBody = self.read_envelope(response).await?;
        body.file
            .map(|f| f.file_id)
            .ok_or_else(|| ProviderError::Decode("upload response has no file".into()))
    }

    async fn clone_voice(
        &self,
        file_id: i64,
        voice_id: &str,
        options: &CloneOptions,
    ) -> Result<(), ProviderError> {
        let request = CloneRequest {
            file_id,
            voice_id,
            need_noise_reduction: options.need_noise_reduction,
            need_volume_normalization: options.need_volume_normalization,
            accuracy: options.accuracy,
            model: options.model.as_str(),
            text: options.text.as_deref(),
        };
        let _: Empty = self.post_json("/v1/voice_clone", true, &request).await?;
        Ok(())
    }

    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        params: &SynthesisParams,
    ) -> Result<Vec<u8>, ProviderError> {
        let request = T2aRequest {
            model: params.model.as_str(),
            text,
            stream: false,
            voice_setting: VoiceSetting {
                voice_id,
                speed: params.speed,
                vol: params.volume,
                pitch: params.pitch,
                emotion: params.emotion.as_ref().map(|e| e.as_str()),
            },
            audio_setting: AudioSetting {
                sample_rate: params.sample_rate,
                bitrate: params.bitrate,
                format: "mp3",
                channel: 1,
            },
            language_boost: params.language_boost.as_deref(),
        };
        let body: T2aBody = self.post_json("/v1/t2a_v2", true, &request).await?;
        let audio_hex = body.data.and_then(|d| d.audio).unwrap_or_default();
        hex::decode(audio_hex.trim()).map_err(|e| ProviderError::Decode(format!("audio is not hex: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_are_rejected() {
        let err = MiniMaxClient::new("", "group", DEFAULT, Duration::from_secs(5));
        assert!(matches!(err, Err(ConnectionError::MissingCredentials)));
        let err = MiniMaxClient::new("key", "  ", DEFAULT, Duration::from_secs(5));
        assert!(matches!(err, Err(ConnectionError::MissingCredentials)));
    }

    const DEFAULT: &str = "https://api.minimax.chat/";

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = MiniMaxClient::new("key", "group", DEFAULT, Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/v1/get_voice"), "https://api.minimax.chat/v1/get_voice");
    }

    #[test]
    fn description_accepts_list_string_or_null() {
        let body: GetVoiceBody = serde_json::from_str(
            r#"{"voice_cloning": [
                {"voice_id": "a", "description": ["x", "y"], "created_time": "2025-01-01"},
                {"voice_id": "b", "description": "solo"},
                {"voice_id": "c", "description": null}
            ]}"#,
        )
        .unwrap();
        let voices = body.voice_cloning.unwrap();
        let descriptions: Vec<Vec<String>> = voices
            .into_iter()
            .map(|v| v.description.unwrap_or_default().into_vec())
            .collect();
        assert_eq!(descriptions[0], ["x", "y"]);
        assert_eq!(descriptions[1], ["solo"]);
        assert!(descriptions[2].is_empty());
    }

    #[test]
    fn t2a_request_shape() {
        let params = SynthesisParams::default();
        let request = T2aRequest {
            model: params.model.as_str(),
            text: "hi",
            stream: false,
            voice_setting: VoiceSetting {
                voice_id: "voice0001",
                speed: params.speed,
                vol: params.volume,
                pitch: params.pitch,
                emotion: None,
            },
            audio_setting: AudioSetting {
                sample_rate: params.sample_rate,
                bitrate: params.bitrate,
                format: "mp3",
                channel: 1,
            },
            language_boost: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["voice_setting"]["voice_id"], "voice0001");
        assert_eq!(json["audio_setting"]["sample_rate"], 44_100);
        assert!(json["voice_setting"].get("emotion").is_none());
        assert!(json.get("language_boost").is_none());
    }
}
