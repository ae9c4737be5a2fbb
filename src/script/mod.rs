pub mod table;

pub use table::{
    load_table, timecode_to_frames, visible_rows, ScriptError, ScriptPick,
    ScriptRow, ScriptTable,
};
