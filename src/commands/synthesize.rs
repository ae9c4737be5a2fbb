use super::{Session, TestArgs};
use crate::voice::SynthesisParams;

fn params_from(args: &TestArgs, base: &SynthesisParams) -> SynthesisParams {
    let mut params = base.clone();
    if let Some(speed) = args.speed {
        params.speed = speed;
    }
    if let Some(volume) = args.volume {
        params.volume = volume;
    }
    if let Some(pitch) = args.pitch {
        params.pitch = pitch;
    }
    if args.emotion.is_some() {
        params.emotion = args.emotion;
    }
    if let Some(boost) = &args.language_boost {
        params.language_boost = Some(boost.clone());
    }
    if let Some(model) = args.model {
        params.model = model;
    }
    params
}

/// Synthesize with the selected voice and write the MP3 to the output directory.
pub async fn test(session: &mut Session, args: TestArgs) -> anyhow::Result<()> {
    let panel = &mut session.panel;
    if let Some(voice) = &args.voice {
        panel.select(voice);
    }

    let text = if args.text.is_empty() {
        panel
            .selection()
            .script()
            .map(|pick| pick.test_text.clone())
            .unwrap_or_default()
    } else {
        args.text.join(" ")
    };
    let params = params_from(&args, &panel.config().synthesis);
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| panel.config().output_dir.clone());

    if let Some(audio) = panel.test_voice(&text, &params).await {
        let path = audio.save_to(&out_dir)?;
        println!(
            "Saved {} bytes from {} to {}",
            audio.audio.len(),
            audio.voice_id,
            path.display()
        );
    }
    Ok(())
}
