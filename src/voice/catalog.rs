use super::interface::VoiceCatalogEntry;

/// System voices shipped with the provider, in presentation order: (id, name).
const MINIMAX_SYSTEM_VOICES: &[(&str, &str)] = &[
    ("male-qn-qingse", "Youthful Male"),
    ("male-qn-jingying", "Elite Young Male"),
    ("male-qn-badao", "Domineering Young Male"),
    ("male-qn-daxuesheng", "College Student Male"),
    ("female-shaonv", "Young Girl"),
    ("female-yujie", "Mature Lady"),
    ("female-chengshu", "Mature Woman"),
    ("female-tianmei", "Sweet Woman"),
    ("presenter_male", "Male Presenter"),
    ("presenter_female", "Female Presenter"),
    ("audiobook_male_1", "Male Audiobook 1"),
    ("audiobook_male_2", "Male Audiobook 2"),
    ("audiobook_female_1", "Female Audiobook 1"),
    ("audiobook_female_2", "Female Audiobook 2"),
    ("male-qn-qingse-jingpin", "Youthful Male (Premium)"),
    ("male-qn-jingying-jingpin", "Elite Young Male (Premium)"),
    ("male-qn-badao-jingpin", "Domineering Young Male (Premium)"),
    ("male-qn-daxuesheng-jingpin", "College Student Male (Premium)"),
    ("female-shaonv-jingpin", "Young Girl (Premium)"),
    ("female-yujie-jingpin", "Mature Lady (Premium)"),
    ("female-chengshu-jingpin", "Mature Woman (Premium)"),
    ("female-tianmei-jingpin", "Sweet Woman (Premium)"),
    ("clever_boy", "Clever Boy"),
    ("cute_boy", "Cute Boy"),
    ("lovely_girl", "Lovely Girl"),
    ("cartoon_pig", "Cartoon Pig"),
    ("bingjiao_didi", "Clingy Little Brother"),
    ("junlang_nanyou", "Handsome Boyfriend"),
    ("chunzhen_xuedi", "Innocent Junior"),
    ("lengdan_xiongzhang", "Aloof Senior"),
    ("badao_shaoye", "Arrogant Young Master"),
    ("tianxin_xiaoling", "Sweet Xiaoling"),
    ("qiaopi_mengmei", "Playful Girl"),
    ("wumei_yujie", "Charming Lady"),
    ("diadia_xuemei", "Coquettish Junior"),
    ("danya_xuejie", "Elegant Senior"),
    ("Santa_Claus", "Santa Claus"),
    ("Grinch", "Grinch"),
    ("Rudolph", "Rudolph"),
    ("Arnold", "Arnold"),
    ("Charming_Santa", "Charming Santa"),
    ("Charming_Lady", "Charming Lady"),
    ("Sweet_Girl", "Sweet Girl"),
    ("Cute_Elf", "Cute Elf"),
    ("Attractive_Girl", "Attractive Girl"),
    ("Serene_Woman", "Serene Woman"),
];

/// Static enumeration of built-in system voices.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    entries: Vec<VoiceCatalogEntry>,
}

impl BuiltinCatalog {
    pub fn minimax() -> Self {
        Self::from_pairs(MINIMAX_SYSTEM_VOICES.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(id, name)| VoiceCatalogEntry::builtin(id, name))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[VoiceCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::minimax()
    }
}

/// Built-in entries first, then remote ones; order within each group is kept
/// and colliding ids are not collapsed.
pub fn merge_system_catalog(
    builtin: &[VoiceCatalogEntry],
    remote: &[VoiceCatalogEntry],
) -> Vec<VoiceCatalogEntry> {
    builtin.iter().chain(remote.iter()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::interface::SourceKind;

    #[test]
    fn duplicates_across_sources_are_kept() {
        let builtin = BuiltinCatalog::from_pairs([("A", "a"), ("B", "b")]);
        let remote = vec![
            VoiceCatalogEntry::remote_system("B", None, vec![]),
            VoiceCatalogEntry::remote_system("C", None, vec![]),
        ];

        let merged = merge_system_catalog(builtin.entries(), &remote);
        let ids: Vec<&str> = merged.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "B", "C"]);
        assert_eq!(merged[1].source_kind, SourceKind::SystemBuiltin);
        assert_eq!(merged[2].source_kind, SourceKind::SystemRemote);
    }

    #[test]
    fn empty_remote_yields_builtin_only() {
        let builtin = BuiltinCatalog::minimax();
        let merged = merge_system_catalog(builtin.entries(), &[]);
        assert_eq!(merged.len(), builtin.len());
    }

    #[test]
    fn minimax_catalog_ids_are_unique() {
        let builtin = BuiltinCatalog::minimax();
        let mut ids: Vec<&str> = builtin.entries().iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), builtin.len());
    }
}
