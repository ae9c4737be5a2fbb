use super::{ConnectArgs, SelectArgs, Session, VoicesArgs};
use crate::voice::interface::{SourceKind, VoiceCatalogEntry, VoiceKind};
use crate::voice::{filter, save_config, sort, PickerSource, SortKey};

pub fn connect(session: &mut Session, args: ConnectArgs) -> anyhow::Result<()> {
    if session.panel.connect(&args.api_key, &args.group_id).is_err() || !args.save {
        return Ok(());
    }
    let mut config = session.panel.config().clone();
    config.api.api_key = Some(args.api_key.trim().to_string());
    config.api.group_id = Some(args.group_id.trim().to_string());
    save_config(&session.config_path, &config)?;
    println!("Credentials saved to {}", session.config_path.display());
    Ok(())
}

/// List a catalog. A fetch triggered here moves the selection to the
/// first fetched voice, as every refresh does.
pub async fn list(session: &mut Session, args: VoicesArgs) -> anyhow::Result<()> {
    let panel = &mut session.panel;
    let kind = if args.system {
        VoiceKind::System
    } else {
        VoiceKind::Cloned
    };
    let catalog = panel.get_voices(kind, args.refresh).await;
    let catalog = match kind {
        VoiceKind::Cloned => catalog.to_vec(),
        VoiceKind::System => panel.merged_system_catalog(),
    };

    let query = args.search.unwrap_or_default();
    let matched = filter(&catalog, &query);
    let shown = match (args.sort, kind) {
        (Some(key), _) => sort(&matched, key),
        (None, VoiceKind::Cloned) => sort(&matched, SortKey::CreatedNewest),
        (None, VoiceKind::System) => matched,
    };

    print_entries(&shown, panel.current());
    if query.is_empty() {
        println!("{} {} voices", shown.len(), kind);
    } else {
        println!("{} of {} {} voices match '{}'", shown.len(), catalog.len(), kind, query);
    }
    Ok(())
}

pub async fn delete(session: &mut Session, voice_ids: Vec<String>) -> anyhow::Result<()> {
    match voice_ids.as_slice() {
        [single] => {
            session.panel.delete_voice(single).await;
        }
        many => {
            session.panel.delete_voices(many).await;
        }
    }
    Ok(())
}

pub async fn select(session: &mut Session, args: SelectArgs) -> anyhow::Result<()> {
    let panel = &mut session.panel;
    if let Some(voice_id) = args.voice_id {
        panel.select(&voice_id);
        println!("Selected {}", voice_id);
        return Ok(());
    }

    let source = if args.system {
        PickerSource::System
    } else {
        PickerSource::Cloned
    };
    let query = args.search.unwrap_or_default();
    let view = panel.picker(source, &query).await;
    if let Some(index) = view.preselected {
        println!("Selected {}", view.entries[index].label());
    }
    Ok(())
}

pub fn status(session: &mut Session) -> anyhow::Result<()> {
    let status = session.panel.status();
    println!(
        "connection : {}",
        match &status.group_id {
            Some(group) => format!("connected (group {})", group),
            None => "not connected".to_string(),
        }
    );
    println!(
        "voice      : {}",
        if status.current_voice.is_empty() {
            "-"
        } else {
            status.current_voice.as_str()
        }
    );
    println!("quick test : {}", status.quick_test.as_deref().unwrap_or("-"));
    match &status.script {
        Some(pick) => println!(
            "script row : prefix {}, search '{}', text '{}'",
            pick.file_prefix, pick.voice_search, pick.test_text
        ),
        None => println!("script row : -"),
    }
    for (name, slot) in [("cloned", &status.cloned), ("system", &status.system)] {
        let age = slot
            .age_secs
            .map(|a| format!("{}s old", a))
            .unwrap_or_else(|| "never fetched".to_string());
        let state = if slot.present { "cached" } else { "empty" };
        println!(
            "{:<11}: {} {} entries, {} (ttl {}s)",
            name, state, slot.entries, age, slot.ttl_secs
        );
    }
    println!("script     : {} rows loaded", session.script.len());
    Ok(())
}

pub(crate) fn print_entries(entries: &[VoiceCatalogEntry], current: &str) {
    for entry in entries {
        let marker = if entry.id == current { '*' } else { ' ' };
        let origin = match entry.source_kind {
            SourceKind::Cloned => "",
            SourceKind::SystemBuiltin => " [built-in]",
            SourceKind::SystemRemote => " [remote]",
        };
        let created = entry
            .created_at
            .map(|c| format!("  {}", c.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!("{} {}{}{}", marker, entry.label(), origin, created);
    }
}
