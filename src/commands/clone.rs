use super::{BatchCloneArgs, CloneArgs, Session};
use crate::voice::{BatchPlan, Notice};

pub async fn clone(session: &mut Session, args: CloneArgs) -> anyhow::Result<()> {
    let mut options = args.options.apply(&session.panel.config().clone);
    options.text = args.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    session
        .panel
        .clone_from_file(&args.file, &args.voice_id, &options)
        .await;
    Ok(())
}

pub async fn batch_clone(session: &mut Session, args: BatchCloneArgs) -> anyhow::Result<()> {
    let options = args.options.apply(&session.panel.config().clone);
    let mut plan = BatchPlan::new(args.files, args.base_id.as_deref());
    if let Some(manifest) = &args.manifest {
        match plan.apply_manifest_file(manifest) {
            Ok(matched) => println!("Manifest matched {} of {} files", matched, plan.len()),
            Err(e) => {
                session.panel.notify(Notice::error(e.to_string()));
                return Ok(());
            }
        }
    }

    for item in plan.items() {
        println!("  {} -> {}", item.file_name, item.voice_id);
    }

    if let Ok(report) = plan.run(&mut session.panel, &options).await {
        for outcome in &report.outcomes {
            match (&outcome.file_id, &outcome.error) {
                (Some(file_id), _) => {
                    println!("  ok    {} (file {})", outcome.voice_id, file_id)
                }
                (None, Some(error)) => println!("  fail  {}: {}", outcome.voice_id, error),
                (None, None) => {}
            }
        }
    }
    Ok(())
}
