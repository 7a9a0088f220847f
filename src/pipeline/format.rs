/*!
 * Typographic normalization of transformed content.
 *
 * Pure functions applying the design team's copy rules: date and weekday
 * abbreviation for English, spacing normalization for Chinese dates and
 * times, title casing driven by layer names, HTML entity decoding and
 * currency substitution. No I/O, no suspension points.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::app_config::Language;

/// Content that formatting must never touch
static SKIP_FORMAT: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from(["*"]));

static MONTH_ABBR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("January", "Jan"), ("February", "Feb"), ("March", "Mar"), ("April", "Apr"),
        ("May", "May"), ("June", "Jun"), ("July", "Jul"), ("August", "Aug"),
        ("September", "Sep"), ("October", "Oct"), ("November", "Nov"), ("December", "Dec"),
    ])
});

static DAY_ABBR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Sunday", "Sun"), ("Monday", "Mon"), ("Tuesday", "Tue"), ("Wednesday", "Wed"),
        ("Thursday", "Thu"), ("Friday", "Fri"), ("Saturday", "Sat"),
    ])
});

static MONTH_NUM_ABBR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("01", "Jan"), ("02", "Feb"), ("03", "Mar"), ("04", "Apr"), ("05", "May"),
        ("06", "Jun"), ("07", "Jul"), ("08", "Aug"), ("09", "Sep"), ("10", "Oct"),
        ("11", "Nov"), ("12", "Dec"),
    ])
});

/// Layer names whose content is rendered as a title
static TITLE_CASE_NODE_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "我是标题", "二级标题", "副标题", "Tab-title", "_Avatar-title", "Dialog-title",
        "Button-text", "Menu__brand-name", "MenuItem-label", "TabPane-text-selected",
        "TabPane-text", "Menu-title", "标题文本", "ModalView_title", "Tag-text",
        "H1", "H2", "Title", "title",
    ])
});

/// Parent layer names that force title casing on their children
static TITLE_CASE_PARENT_NODE_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "[D] Tag_Avatar_Person",
        "[M] Tag_Avatar_Person",
        "🌞DS Desktop Button",
        "🌞DS Desktop Tab Primary Large",
    ])
});

/// Words kept lowercase inside a title (unless leading)
static TITLE_CASE_SKIP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "and", "or", "but", "the", "a", "an", "in", "on", "at", "for", "to", "with",
        "by", "of", "as", "is", "are", "was", "were",
    ])
});

static HTML_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#39;|&quot;|&amp;|&lt;|&gt;|&nbsp;").unwrap());

static HTML_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("&#39;", "'"),
        ("&quot;", "\""),
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&nbsp;", " "),
    ])
});

static DATE_SLASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})/(\d{2})/(\d{2})(?:-(\d{4})/(\d{2})/(\d{2}))?").unwrap()
});

const EN_MONTH: &str = "(January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";
const EN_WEEKDAY: &str =
    "(Sunday|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sun|Mon|Tue|Wed|Thu|Fri|Sat)";

/// Written date-times: "Friday, March 14, 2025, 9:30" and its partial forms
static EN_DT_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:{EN_WEEKDAY}[,\s]+)?{EN_MONTH}\s+(\d{{1,2}})(?:[,\s]+(\d{{4}}))?[,\s]+(\d{{1,2}}:\d{{2}})"
    ))
    .unwrap()
});

/// Numeric date-times: "2025/3/14, 9:30" with -, . or / separators
static EN_DT_NUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})[,\s]+(\d{1,2}:\d{2})\b").unwrap()
});

static DAY_COMMA_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(Sunday|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday), {EN_MONTH} \d{{1,2}}\b"
    ))
    .unwrap()
});

static FULL_MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(January|February|March|April|May|June|July|August|September|October|November|December) (\d{1,2})").unwrap()
});

/// Format content according to the target language's typographic rules.
///
/// Returns `None` when there is nothing to change (empty content or content
/// in the skip list); callers treat that as "leave the fragment untouched".
pub fn format_content(
    content: &str,
    target: Language,
    node_name: &str,
    parent_node_name: &str,
) -> Option<String> {
    if content.is_empty() || SKIP_FORMAT.contains(content) {
        return None;
    }

    let mut out = match target {
        Language::En => format_english(content, node_name, parent_node_name),
        Language::Zh => format_chinese(content),
    };

    out = decode_html_entities(&out);
    out = format_currency(&out, target);
    Some(out)
}

fn format_english(content: &str, node_name: &str, parent_node_name: &str) -> String {
    let mut out = format_date_time(content);
    out = format_slash_dates(&out);
    out = abbreviate_weekday(&out);
    out = abbreviate_month(&out);
    out = apply_casing(&out, node_name, parent_node_name);
    remove_terminal_period(&out)
}

fn format_date_time(content: &str) -> String {
    let pass1 = EN_DT_TEXT_RE.replace_all(content, |caps: &regex::Captures| {
        let weekday = caps.get(1).map(|m| m.as_str());
        let month = &caps[2];
        let day: u32 = caps[3].parse().unwrap_or(0);
        let year = caps.get(4).map(|m| m.as_str());
        let time = &caps[5];

        let month = MONTH_ABBR.get(month).copied().unwrap_or(month);
        let weekday = weekday.map(|w| *DAY_ABBR.get(w).unwrap_or(&w));
        let date_part = match year {
            Some(y) => format!("{} {}, {}", month, day, y),
            None => format!("{} {}", month, day),
        };
        match weekday {
            Some(w) => format!("{}, {}, {}", w, date_part, time),
            None => format!("{}, {}", date_part, time),
        }
    });

    EN_DT_NUM_RE
        .replace_all(&pass1, |caps: &regex::Captures| {
            let year = &caps[1];
            let month_key = format!("{:0>2}", &caps[2]);
            let day: u32 = caps[3].parse().unwrap_or(0);
            let time = &caps[4];
            let month = MONTH_NUM_ABBR
                .get(month_key.as_str())
                .copied()
                .unwrap_or("");
            format!("{} {}, {}, {}", month, day, year, time)
        })
        .into_owned()
}

fn format_slash_dates(content: &str) -> String {
    DATE_SLASH_RE
        .replace_all(content, |caps: &regex::Captures| {
            let single = |year: &str, month: &str, day: &str| {
                let month = MONTH_NUM_ABBR.get(month).copied().unwrap_or("");
                let day: u32 = day.parse().unwrap_or(0);
                format!("{} {}, {}", month, day, year)
            };
            let first = single(&caps[1], &caps[2], &caps[3]);
            match (caps.get(4), caps.get(5), caps.get(6)) {
                (Some(y), Some(m), Some(d)) => {
                    format!("{} - {}", first, single(y.as_str(), m.as_str(), d.as_str()))
                }
                _ => first,
            }
        })
        .into_owned()
}

fn abbreviate_weekday(content: &str) -> String {
    DAY_COMMA_MONTH_RE
        .replace_all(content, |caps: &regex::Captures| {
            let full = &caps[0];
            match full.split_once(", ") {
                Some((day, rest)) => {
                    format!("{}, {}", DAY_ABBR.get(day).copied().unwrap_or(day), rest)
                }
                None => full.to_string(),
            }
        })
        .into_owned()
}

fn abbreviate_month(content: &str) -> String {
    FULL_MONTH_DAY_RE
        .replace_all(content, |caps: &regex::Captures| {
            let month = &caps[1];
            format!("{} {}", MONTH_ABBR.get(month).copied().unwrap_or(month), &caps[2])
        })
        .into_owned()
}

fn apply_casing(content: &str, node_name: &str, parent_node_name: &str) -> String {
    if TITLE_CASE_NODE_NAMES.contains(node_name)
        || TITLE_CASE_PARENT_NODE_NAMES.contains(parent_node_name)
    {
        return title_case(content);
    }
    format_short_fragment(content)
}

fn title_case(content: &str) -> String {
    content
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            if i == 0 || !TITLE_CASE_SKIP_WORDS.contains(word.to_lowercase().as_str()) {
                capitalize(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sentence-style casing for one- and two-word fragments; longer fragments
/// are left alone
fn format_short_fragment(content: &str) -> String {
    let words: Vec<&str> = content.split(' ').collect();
    match words.as_slice() {
        [only] => capitalize(only),
        [first, second] => format!("{} {}", capitalize(first), second.to_lowercase()),
        _ => content.to_string(),
    }
}

/// Strip a lone terminal period from single-sentence fragments
fn remove_terminal_period(content: &str) -> String {
    let trimmed = content.trim_end();
    if !trimmed.ends_with('.') || trimmed.ends_with("...") {
        return content.to_string();
    }
    if trimmed.contains(',') {
        return content.to_string();
    }
    let before_last = &trimmed[..trimmed.len() - 1];
    if before_last.contains('.') || before_last.contains('!') || before_last.contains('?') {
        return content.to_string();
    }
    match content.rfind('.') {
        Some(pos) => {
            let mut out = content.to_string();
            out.remove(pos);
            out
        }
        None => content.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn decode_html_entities(content: &str) -> String {
    HTML_ENTITY_RE
        .replace_all(content, |caps: &regex::Captures| {
            let entity = &caps[0];
            HTML_ENTITIES.get(entity).copied().unwrap_or(entity).to_string()
        })
        .into_owned()
}

fn format_currency(content: &str, target: Language) -> String {
    match target {
        Language::En => content.replace('¥', "$").replace("CNY", "USD"),
        Language::Zh => content.replace('$', "¥").replace("USD", "CNY"),
    }
}

// Chinese date/time spacing. Several rules need negative lookahead to avoid
// re-spacing inside a longer date, hence fancy_regex here.
mod zh {
    use fancy_regex::Regex;
    use once_cell::sync::Lazy;

    macro_rules! re {
        ($pattern:expr) => {
            Lazy::new(|| Regex::new($pattern).unwrap())
        };
    }

    static COLLAPSE_FULL: Lazy<Regex> =
        re!(r"(\d{1,4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日");
    static COLLAPSE_YEAR_MONTH: Lazy<Regex> = re!(r"(\d{1,4})\s*年\s*(\d{1,2})\s*月");
    static COLLAPSE_MONTH_DAY: Lazy<Regex> = re!(r"(\d{1,2})\s*月\s*(\d{1,2})\s*日");
    static COLLAPSE_YEAR: Lazy<Regex> = re!(r"(\d{1,4})\s*年");
    static DATE_COMMA_WEEKDAY: Lazy<Regex> =
        re!(r"(\d{1,4}年)?(\d{1,2}月\d{1,2}日)，\s*(周[一二三四五六日])");
    static SPACE_BEFORE_FULL: Lazy<Regex> = re!(r"([^\s0-9])(\d{1,4}年\d{1,2}月\d{1,2}日)");
    static SPACE_BEFORE_YEAR_MONTH: Lazy<Regex> = re!(r"([^\s0-9])(\d{1,4}年\d{1,2}月)");
    static SPACE_BEFORE_MONTH_DAY: Lazy<Regex> = re!(r"([^\s0-9年])(\d{1,2}月\d{1,2}日)");
    static SPACE_BEFORE_YEAR: Lazy<Regex> = re!(r"([^\s0-9])(\d{1,4}年)(?!\d{1,2}月)");
    static SPACE_AFTER_FULL: Lazy<Regex> = re!(r"(\d{1,4}年\d{1,2}月\d{1,2}日)([^\s])");
    static SPACE_AFTER_YEAR_MONTH: Lazy<Regex> =
        re!(r"(\d{1,4}年\d{1,2}月)(?!\d{1,2}日)([^\s])");
    static SPACE_AFTER_MONTH_DAY: Lazy<Regex> = re!(r"(\d{1,2}月\d{1,2}日)([^\s])");
    static SPACE_AFTER_YEAR: Lazy<Regex> = re!(r"(\d{1,4}年)(?!\d{1,2}月)([^\s])");
    static SPACE_BEFORE_TIME: Lazy<Regex> = re!(r"([^\s0-9])(\d{1,2}:\d{2}(?::\d{2})?)");
    static SPACE_AFTER_TIME: Lazy<Regex> = re!(r"(\d{1,2}:\d{2}(?::\d{2})?)([^\s])");

    pub fn format(content: &str) -> String {
        // CJK characters are valid capture-name characters, so an unbraced
        // $1年 would reference a group named "1年"; brace every reference
        let mut out = COLLAPSE_FULL
            .replace_all(content, "${1}年${2}月${3}日")
            .into_owned();
        out = COLLAPSE_YEAR_MONTH.replace_all(&out, "${1}年${2}月").into_owned();
        out = COLLAPSE_MONTH_DAY.replace_all(&out, "${1}月${2}日").into_owned();
        out = COLLAPSE_YEAR.replace_all(&out, "${1}年").into_owned();
        out = DATE_COMMA_WEEKDAY
            .replace_all(&out, "${1}${2} $3")
            .into_owned();
        out = SPACE_BEFORE_FULL.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_BEFORE_YEAR_MONTH.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_BEFORE_MONTH_DAY.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_BEFORE_YEAR.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_AFTER_FULL.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_AFTER_YEAR_MONTH.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_AFTER_MONTH_DAY.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_AFTER_YEAR.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_BEFORE_TIME.replace_all(&out, "$1 $2").into_owned();
        out = SPACE_AFTER_TIME.replace_all(&out, "$1 $2").into_owned();
        out
    }
}

fn format_chinese(content: &str) -> String {
    zh::format(content)
}
