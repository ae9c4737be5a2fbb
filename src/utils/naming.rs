use pinyin::ToPinyin;

const MAX_STEM_CHARS: usize = 15;
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn free text into a file name stem.
///
/// Control characters and characters reserved on common filesystems are
/// dropped. Stems longer than 15 characters are cut and given a short random
/// suffix so different long texts sharing a prefix don't collide.
pub fn safe_filename(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !(c.is_ascii_control() || RESERVED.contains(c)))
        .collect();
    if cleaned.chars().count() <= MAX_STEM_CHARS {
        return cleaned;
    }
    let stem: String = cleaned.chars().take(MAX_STEM_CHARS).collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", stem, &suffix[..4])
}

/// Download name for synthesized test audio.
pub fn download_file_name(prefix: Option<&str>, voice_id: &str, text: &str) -> String {
    let stem = safe_filename(text);
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}_{}_{}.mp3", prefix, voice_id, stem),
        None => format!("{}_{}.mp3", voice_id, stem),
    }
}

/// Toneless pinyin, syllables run together. Anything that isn't a Han
/// character is kept as is.
pub fn to_pinyin(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c.to_pinyin() {
            Some(p) => out.push_str(p.plain()),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_and_reserved_chars() {
        assert_eq!(safe_filename("a\tb\nc"), "abc");
        assert_eq!(safe_filename("what? <yes>"), "what yes");
        assert_eq!(safe_filename("a/b\\c:d|e"), "abcde");
        assert_eq!(safe_filename("\u{7f}ok"), "ok");
    }

    #[test]
    fn long_text_is_cut_with_suffix() {
        let name = safe_filename("The quick brown fox jumps");
        assert!(name.starts_with("The quick brown_"));
        assert_eq!(name.chars().count(), 15 + 1 + 4);
        assert!(name[16..].chars().all(|c| c.is_ascii_hexdigit()));

        let exact = "123456789012345";
        assert_eq!(safe_filename(exact), exact);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "你好世界你好世界你好世界你好世";
        assert_eq!(text.chars().count(), 15);
        assert_eq!(safe_filename(text), text);
    }

    #[test]
    fn download_names() {
        assert_eq!(download_file_name(None, "voice001", "hi"), "voice001_hi.mp3");
        assert_eq!(
            download_file_name(Some("0102"), "voice001", "hi"),
            "0102_voice001_hi.mp3"
        );
        assert_eq!(download_file_name(Some(""), "voice001", "hi"), "voice001_hi.mp3");
    }

    #[test]
    fn pinyin_is_toneless_and_concatenated() {
        assert_eq!(to_pinyin("小明"), "xiaoming");
        assert_eq!(to_pinyin("A队01"), "Adui01");
        assert_eq!(to_pinyin(""), "");
    }
}
