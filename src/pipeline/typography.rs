/*!
 * Typography style dictionary.
 *
 * Maps the design system's text styles to shared style keys. The table is
 * exported from the design system and maintained by hand; style keys are
 * stable identifiers of shared styles in the host document. Lookups match
 * exactly on (font style, font size, language, platform).
 */

use crate::app_config::{Language, Platform};

/// One text style of the design system
#[derive(Debug, Clone, Copy)]
pub struct TypographyStyle {
    pub name: &'static str,
    pub font_family: &'static str,
    pub font_style: &'static str,
    pub font_size: u32,
    pub line_height: u32,
    pub language: Language,
    pub platform: Platform,
    pub style_key: &'static str,
}

macro_rules! style {
    ($name:literal, $family:literal, $style:literal, $size:literal, $lh:literal, $lang:ident, $platform:ident, $key:literal) => {
        TypographyStyle {
            name: $name,
            font_family: $family,
            font_style: $style,
            font_size: $size,
            line_height: $lh,
            language: Language::$lang,
            platform: Platform::$platform,
            style_key: $key,
        }
    };
}

/// The full dictionary, one entry per named style
pub static TYPOGRAPHY: &[TypographyStyle] = &[
    // Desktop / Chinese
    style!("特大标题", "PingFang SC", "Semibold", 30, 46, Zh, Desktop, "bb7500b30fed51ed976517f2fd65f263d1145d66"),
    style!("一级标题", "PingFang SC", "Semibold", 24, 36, Zh, Desktop, "220be5c405c5b808bc8231e7ea05f33231eb1242"),
    style!("二级标题", "PingFang SC", "Medium", 20, 30, Zh, Desktop, "08bb5f5da607b2bdb4969be6cc6bf0d5a197ba8f"),
    style!("三级标题", "PingFang SC", "Medium", 18, 28, Zh, Desktop, "93f289fa230ecc35b45cd8fe5f41b155cf3bb768"),
    style!("四级标题", "PingFang SC", "Medium", 16, 24, Zh, Desktop, "a57f240e66b420744d4f7ec85d890e5641829312"),
    style!("五级标题", "PingFang SC", "Regular", 16, 24, Zh, Desktop, "efa77a01fe18c71a508b610a9c5674aa95c4fd2c"),
    style!("辅助标题", "PingFang SC", "Medium", 14, 22, Zh, Desktop, "60b3b4ad8906cb69682eae4f4095693128a5e900"),
    style!("正文", "PingFang SC", "Regular", 14, 22, Zh, Desktop, "10f4b615066ae8e6456961e593dca76768302bce"),
    style!("正文辅助", "PingFang SC", "Regular", 12, 20, Zh, Desktop, "c376b786aede4dbf8ca98b63498ebebbc5ce7e06"),
    style!("辅助", "PingFang SC", "Medium", 12, 20, Zh, Desktop, "f4039cc49a63b49e2bdeb17c73f573116d0330b9"),
    // These two are filed under English in the exported style table
    style!("小辅助", "PingFang SC", "Medium", 10, 16, En, Desktop, "435a78769cf4fca9fa83819947af4c6cde58c167"),
    style!("最小辅助", "PingFang SC", "Regular", 10, 16, En, Desktop, "8b58b2f36e7fb7908be628ae59167c7d748f442e"),
    // Desktop / English
    style!("Title-0", "SF Pro Text", "Semibold", 30, 46, En, Desktop, "001b1341efd53cd832dd322a929abcecfe164011"),
    style!("Title-1", "SF Pro Text", "Semibold", 24, 36, En, Desktop, "db59a74c4063c9b1c19f0cbf98168762ff679074"),
    style!("Title-2", "SF Pro Text", "Medium", 20, 30, En, Desktop, "f9ef6f8980675286ade38ceda42e2ab478677ebc"),
    style!("Title-3", "SF Pro Text", "Medium", 18, 28, En, Desktop, "32268b86bddba13108e6e639b0ed19c596fc0911"),
    style!("Title-4", "SF Pro Text", "Medium", 16, 24, En, Desktop, "31dbe7076ad0a5c8f0e1bc0119bed7bfb328746f"),
    style!("Title-5", "SF Pro Text", "Regular", 16, 24, En, Desktop, "2bea416b34e7527bdcd03e7a389ca7e081f32c1b"),
    style!("Headline", "SF Pro Text", "Medium", 14, 22, En, Desktop, "79ea3d768e7c168125eadf7677a6594f67f1715a"),
    style!("Body-0", "SF Pro Text", "Regular", 14, 22, En, Desktop, "31ecf056f58ea611c0ae256dd94d2e4c0dc55f9d"),
    style!("Body-2", "SF Pro Text", "Regular", 12, 20, En, Desktop, "ef2b901d720e847a9be44a4814c01282ecada982"),
    style!("Caption-0", "SF Pro Text", "Medium", 12, 20, En, Desktop, "dbed45afb5da6f5568a5458b95d5e2f1848c3d3f"),
    style!("Caption-1", "SF Pro Text", "Medium", 10, 16, En, Desktop, "7fdbe6f0a3685f5aac25a3087accb2f605c02a95"),
    style!("Caption-3", "SF Pro Text", "Regular", 10, 16, En, Desktop, "b55e01884f5be5c4a74fdac766643fdbfbd2eaeb"),
    // Mobile / Chinese
    style!("特大标题", "PingFang SC", "Semibold", 26, 40, Zh, Mobile, "11669e746cc3a9f41e9f856549bc58326d092cee"),
    style!("一级标题", "PingFang SC", "Semibold", 24, 36, Zh, Mobile, "4c147a2f02dee3b542e0495f943c28b677674633"),
    style!("二级标题", "PingFang SC", "Medium", 20, 30, Zh, Mobile, "fe745d3290b9b009817381940d6ab9137e646398"),
    style!("三级标题", "PingFang SC", "Medium", 17, 26, Zh, Mobile, "e36c1dcff68ea37d9b584e2212534f0ac1a509e1"),
    style!("四级标题", "PingFang SC", "Regular", 17, 26, Zh, Mobile, "82cb627ed551a871fb6e99ae5f69351134eea8d0"),
    style!("辅助标题", "PingFang SC", "Medium", 16, 24, Zh, Mobile, "9e77a5fc64d6f1822a1e7664e3c25fdc34974097"),
    style!("正文", "PingFang SC", "Regular", 16, 24, Zh, Mobile, "2403fbfb07379ae8a8f0295acf34e24f646a0fa7"),
    style!("正文大辅助", "PingFang SC", "Medium", 14, 22, Zh, Mobile, "0b6946cbd0a36740a4118dbb7afda49453fade92"),
    style!("正文辅助", "PingFang SC", "Regular", 14, 22, Zh, Mobile, "2b29e93880bcf9b080cba3054d56148166eaa55b"),
    style!("辅助", "PingFang SC", "Medium", 12, 20, Zh, Mobile, "6bc0f647777e4b21779223dbc8052f723a0fd228"),
    style!("小辅助", "PingFang SC", "Regular", 12, 20, Zh, Mobile, "bba4b582bc37ff8ccb8d251defb9fc3047469265"),
    style!("次小辅助", "PingFang SC", "Medium", 10, 16, Zh, Mobile, "cfb6b9fb454941d5af0a56b9821186d7a0df4d63"),
    style!("最小辅助", "PingFang SC", "Regular", 10, 16, Zh, Mobile, "4e4c30c33da9251704e946e412cac5410218000b"),
    // Mobile / English
    style!("Title-0", "SF Pro Text", "Semibold", 26, 40, En, Mobile, "54af45c2fe434928c7b77cb5b50466ddcca1ae2a"),
    style!("Title-1", "SF Pro Text", "Semibold", 24, 36, En, Mobile, "738bd450de0ba09df881b6848efd290e6f723d2c"),
    style!("Title-2", "SF Pro Text", "Medium", 20, 30, En, Mobile, "b09669fa4780e7dfa56025f344ad704fec756fb7"),
    style!("Title-3", "SF Pro Text", "Medium", 17, 26, En, Mobile, "cab6659953b6006232ffe374f1cf5ab260f2a904"),
    style!("Title-4", "SF Pro Text", "Regular", 17, 26, En, Mobile, "5756b32ce2a1d62ae08034cdcef7696a6adfddbc"),
    style!("Headline", "SF Pro Text", "Medium", 16, 24, En, Mobile, "07b471f10b3faced04b3a5a41c3e09ca8a491971"),
    style!("Body-0", "SF Pro Text", "Regular", 16, 24, En, Mobile, "f3356134a4300806bc4fbf38145308f34fc2db70"),
    style!("Body-1", "SF Pro Text", "Medium", 14, 22, En, Mobile, "e789456cd7962dce0161e3510915b9a7dc57dd27"),
    style!("Body-2", "SF Pro Text", "Regular", 14, 22, En, Mobile, "e2b8d2fee8a61347ed94d8e11dff4a176e4b553d"),
    style!("Caption-0", "SF Pro Text", "Medium", 12, 20, En, Mobile, "a6765109001d3c6f2d82e2292a1e043aecc29589"),
    style!("Caption-1", "SF Pro Text", "Regular", 12, 20, En, Mobile, "f2d412a976bbf7e40bcc4615c47578d8bbc64dab"),
    style!("Caption-2", "SF Pro Text", "Medium", 10, 16, En, Mobile, "e1b82f6ba4048bc09932b646587bea04d47c7cc6"),
    style!("Caption-3", "SF Pro Text", "Regular", 10, 16, En, Mobile, "0b211cb702dec992c1df5dbaaf7297e0ae180f30"),
];

/// Table scan in declaration order; duplicate keys resolve to the first entry
fn lookup(
    font_style: &str,
    font_size: u32,
    language: Language,
    platform: Platform,
) -> Option<&'static TypographyStyle> {
    if font_style.is_empty() || font_size == 0 {
        return None;
    }
    TYPOGRAPHY.iter().find(|e| {
        e.font_style == font_style
            && e.font_size == font_size
            && e.language == language
            && e.platform == platform
    })
}

/// Resolve the shared style key for a text fragment's current font
pub fn style_key_for(
    font_style: &str,
    font_size: u32,
    language: Language,
    platform: Platform,
) -> Option<&'static str> {
    lookup(font_style, font_size, language, platform).map(|e| e.style_key)
}

/// Resolve the (family, style) pair for a text fragment's current font
pub fn font_for(
    font_style: &str,
    font_size: u32,
    language: Language,
    platform: Platform,
) -> Option<(&'static str, &'static str)> {
    lookup(font_style, font_size, language, platform).map(|e| (e.font_family, e.font_style))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_key_lookup_should_match_exactly() {
        let key = style_key_for("Regular", 14, Language::En, Platform::Desktop);
        assert_eq!(key, Some("31ecf056f58ea611c0ae256dd94d2e4c0dc55f9d"));
    }

    #[test]
    fn test_style_key_lookup_should_respect_platform() {
        let desktop = style_key_for("Semibold", 24, Language::Zh, Platform::Desktop);
        let mobile = style_key_for("Semibold", 24, Language::Zh, Platform::Mobile);
        assert_ne!(desktop, mobile);
        assert!(desktop.is_some() && mobile.is_some());
    }

    #[test]
    fn test_lookup_should_reject_invalid_inputs() {
        assert_eq!(style_key_for("", 14, Language::En, Platform::Desktop), None);
        assert_eq!(style_key_for("Regular", 0, Language::En, Platform::Desktop), None);
        assert_eq!(style_key_for("Black", 99, Language::En, Platform::Desktop), None);
    }

    #[test]
    fn test_font_lookup_should_return_family_and_style() {
        let font = font_for("Regular", 16, Language::Zh, Platform::Mobile);
        assert_eq!(font, Some(("PingFang SC", "Regular")));
    }

    #[test]
    fn test_duplicate_index_keys_should_keep_first_entry() {
        // 小辅助 (desktop, filed under En) and Caption-1 share Medium|10|En|Desktop
        let key = style_key_for("Medium", 10, Language::En, Platform::Desktop);
        assert_eq!(key, Some("435a78769cf4fca9fa83819947af4c6cde58c167"));
    }
}
