use super::voices::print_entries;
use super::{ScriptArgs, Session};
use crate::script::{load_table, visible_rows, ScriptTable};
use crate::voice::{Notice, PickerSource};

use std::path::Path;

fn loaded_notice(table: &ScriptTable, path: &Path) -> Notice {
    if table.is_empty() {
        Notice::info(format!("Script {} has no rows", path.display()))
    } else {
        Notice::success(format!("Loaded {} rows from {}", table.len(), path.display()))
    }
}

pub async fn script(session: &mut Session, args: ScriptArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.file {
        match load_table(path) {
            Ok(table) => {
                session.panel.notify(loaded_notice(&table, path));
                session.script = table;
                if session.script.is_empty() {
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::warn!("[Script] {}", e);
                session.script = ScriptTable::default();
                session.panel.notify(Notice::error(e.to_string()));
                return Ok(());
            }
        }
    }

    if args.clear {
        session.panel.clear_script_pick();
        println!("Script row cleared");
        return Ok(());
    }

    if session.script.is_empty() {
        session
            .panel
            .notify(Notice::info("Load a script with --file to start"));
        return Ok(());
    }

    if let Some(number) = args.pick {
        let Some(row) = session.script.row(number) else {
            session
                .panel
                .notify(Notice::warning(format!("No row {}", number)));
            return Ok(());
        };
        let pick = row.pick();
        session.panel.apply_script_pick(pick.clone());
        session.panel.notify(Notice::success(format!(
            "Picked row {}; run `test` to speak it",
            number
        )));

        // follow the speaker name into the cloned voice picker
        if !pick.voice_search.is_empty() {
            let view = session
                .panel
                .picker(PickerSource::Cloned, &pick.voice_search)
                .await;
            print_entries(&view.entries, session.panel.current());
        }
        return Ok(());
    }

    let query = args.search.unwrap_or_default();
    let rows = match session.script.view(&query, args.after.as_deref()) {
        Ok(rows) => rows,
        Err(e) => {
            session.panel.notify(Notice::warning(e.to_string()));
            return Ok(());
        }
    };
    if rows.is_empty() {
        session.panel.notify(Notice::warning("No matching rows"));
        return Ok(());
    }

    if !session.script.headers.is_empty() {
        println!("      {}", session.script.headers.join(" | "));
    }
    let shown = visible_rows(&rows, args.expand);
    for row in shown {
        let mut cells: Vec<String> = (0..5).map(|i| row.cell(i).to_string()).collect();
        cells[0] = row.pick().file_prefix;
        println!("{:>5} {}", row.number, cells.join(" | "));
    }
    if shown.len() < rows.len() {
        println!(
            "{} of {} rows shown{}",
            shown.len(),
            rows.len(),
            if args.expand { "; narrow the search to see more" } else { "; use --expand for more" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{NoticeLevel, PanelConfig, VoicePanel};
    use std::path::PathBuf;

    fn session() -> Session {
        Session::new(VoicePanel::new(PanelConfig::default()), PathBuf::from("panel.json"))
    }

    #[tokio::test]
    async fn load_failure_reports_the_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.xlsx");
        std::fs::write(&path, b"not a spreadsheet").unwrap();

        let mut session = session();
        let args = ScriptArgs {
            file: Some(path),
            ..Default::default()
        };
        script(&mut session, args).await.unwrap();

        let notices = session.panel.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("lines.xlsx"));
        assert!(session.script.is_empty());
    }

    #[test]
    fn header_only_sheet_is_info_not_failure() {
        let path = Path::new("empty.xlsx");
        let empty = ScriptTable::from_rows(vec!["TC".into(), "Line".into()], Vec::new());
        let notice = loaded_notice(&empty, path);
        assert_eq!(notice.level, NoticeLevel::Info);

        let one = ScriptTable::from_rows(Vec::new(), vec![vec!["00:00:01:00".into()]]);
        assert_eq!(loaded_notice(&one, path).level, NoticeLevel::Success);
    }
}
