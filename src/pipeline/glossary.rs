/*!
 * Static bilingual glossary.
 *
 * Fixed vocabulary for trivial UI strings. A glossary hit short-circuits the
 * translation provider entirely and marks the item as final vocabulary, so
 * it also skips polishing.
 */

use crate::app_config::Language;

/// A fixed bilingual pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlossaryEntry {
    /// Simplified Chinese side
    pub zh: &'static str,
    /// English side
    pub en: &'static str,
}

/// The glossary is immutable static data, loaded once.
pub static GLOSSARY: &[GlossaryEntry] = &[
    GlossaryEntry { zh: "确定", en: "Confirm" },
    GlossaryEntry { zh: "取消", en: "Cancel" },
    GlossaryEntry { zh: "保存", en: "Save" },
    GlossaryEntry { zh: "提交", en: "Submit" },
    GlossaryEntry { zh: "编辑", en: "Edit" },
    GlossaryEntry { zh: "删除", en: "Delete" },
    GlossaryEntry { zh: "上传", en: "Upload" },
    GlossaryEntry { zh: "下载", en: "Download" },
    GlossaryEntry { zh: "添加", en: "Add" },
    GlossaryEntry { zh: "返回", en: "Back" },
    GlossaryEntry { zh: "首页", en: "Home" },
    GlossaryEntry { zh: "详情", en: "Details" },
    GlossaryEntry { zh: "请搜索", en: "Please search" },
    GlossaryEntry { zh: "请输入", en: "Please enter" },
    GlossaryEntry { zh: "请选择", en: "Please select" },
    GlossaryEntry { zh: "启用", en: "Enable" },
    GlossaryEntry { zh: "禁用", en: "Disable" },
    GlossaryEntry { zh: "已启用", en: "Enabled" },
    GlossaryEntry { zh: "已禁用", en: "Disabled" },
    GlossaryEntry { zh: "导入", en: "Import" },
    GlossaryEntry { zh: "导出", en: "Export" },
];

/// Exact-match lookup after trimming. Only the two directions of the zh/en
/// pair are recognized; any other combination (including same→same) is None.
pub fn lookup(text: &str, source: Language, target: Language) -> Option<&'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match (source, target) {
        (Language::Zh, Language::En) => GLOSSARY
            .iter()
            .find(|e| e.zh == trimmed)
            .map(|e| e.en),
        (Language::En, Language::Zh) => GLOSSARY
            .iter()
            .find(|e| e.en == trimmed)
            .map(|e| e.zh),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_should_match_supported_direction() {
        assert_eq!(lookup("确定", Language::Zh, Language::En), Some("Confirm"));
        assert_eq!(lookup("Cancel", Language::En, Language::Zh), Some("取消"));
    }

    #[test]
    fn test_lookup_should_trim_whitespace() {
        assert_eq!(lookup("  确定  ", Language::Zh, Language::En), Some("Confirm"));
        assert_eq!(lookup("\tSave\n", Language::En, Language::Zh), Some("保存"));
    }

    #[test]
    fn test_lookup_should_reject_same_language_pair() {
        assert_eq!(lookup("确定", Language::Zh, Language::Zh), None);
        assert_eq!(lookup("Confirm", Language::En, Language::En), None);
    }

    #[test]
    fn test_lookup_should_miss_unknown_text() {
        assert_eq!(lookup("某个很长的句子", Language::Zh, Language::En), None);
        assert_eq!(lookup("", Language::Zh, Language::En), None);
    }

    #[test]
    fn test_lookup_is_exact_not_partial() {
        // A sentence containing a glossary term is not a hit
        assert_eq!(lookup("请确定这个选项", Language::Zh, Language::En), None);
    }
}
