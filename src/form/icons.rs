//! 图标词表与关键词兜底
//!
//! ICON_VOCABULARY 是渲染端认识的全部图标名；DefaultIconMapper 按固定顺序的关键词规则把选项标题映射到图标，
//! 都不命中时落到通用形状 DEFAULT_ICON。

use std::sync::OnceLock;

use regex::Regex;

/// 通用兜底图标（本身也在词表内）
pub const DEFAULT_ICON: &str = "circle";

/// Emoji 缺失时的占位符
pub const DEFAULT_EMOJI: &str = "✨";

/// 渲染端支持的图标名
pub const ICON_VOCABULARY: &[&str] = &[
    "home",
    "building",
    "briefcase",
    "user",
    "users",
    "heart",
    "star",
    "shield",
    "dollar-sign",
    "credit-card",
    "calendar",
    "clock",
    "map-pin",
    "phone",
    "mail",
    "file-text",
    "truck",
    "car",
    "wrench",
    "hammer",
    "leaf",
    "sun",
    "zap",
    "droplet",
    "shopping-cart",
    "gift",
    "graduation-cap",
    "book",
    "camera",
    "music",
    "coffee",
    "utensils",
    "plane",
    "globe",
    "laptop",
    "smartphone",
    "settings",
    "stethoscope",
    "activity",
    "dog",
    "baby",
    "key",
    "lock",
    "package",
    "trending-up",
    "bar-chart",
    "thumbs-up",
    "check-circle",
    "x-circle",
    "help-circle",
    "alert-triangle",
    "circle",
];

/// 关键词规则：按顺序匹配，先命中者胜。
/// 关键词按整词匹配（允许复数 s / es 结尾）；写成 `\w*` 结尾的是词干，匹配以它开头的词。
const KEYWORD_RULES: &[(&str, &str)] = &[
    (r"home|house|residential|apartment|condo", "home"),
    (r"office|commercial|business|company|corporate", "building"),
    (r"car|vehicle|auto|automotive", "car"),
    (r"truck|moving|delivery|shipping|freight", "truck"),
    (r"repair\w*|fix|fixing|maintenance|servic\w*", "wrench"),
    (r"build\w*|construct\w*|renovat\w*|remodel\w*", "hammer"),
    (r"garden\w*|lawn|landscap\w*|plant|tree", "leaf"),
    (r"solar|sun|sunny|outdoor", "sun"),
    (r"electric\w*|power|energy|lighting", "zap"),
    (r"water|plumb\w*|leak\w*|pipe", "droplet"),
    (r"budget|price|pricing|cost|money|cheap|afford\w*", "dollar-sign"),
    (r"pay|payment|card|financ\w*|loan", "credit-card"),
    (r"date|schedule|calendar|week\w*|month\w*", "calendar"),
    (r"time|urgent\w*|asap|hour|today|immediate\w*", "clock"),
    (r"location|address|area|local|nearby", "map-pin"),
    (r"phone|call|mobile", "phone"),
    (r"email|mail|newsletter", "mail"),
    (r"document|file|paper|report|contract", "file-text"),
    (r"health\w*|medical|doctor|clinic|dental|cardio\w*", "stethoscope"),
    (r"pet|dog|cat|animal", "dog"),
    (r"travel\w*|flight|trip|vacation", "plane"),
    (r"learn\w*|course|school|education|training", "graduation-cap"),
    (r"yes|definitely|absolutely", "check-circle"),
    (r"no|none|never", "x-circle"),
    (r"other|unsure|not sure|maybe|don't know", "help-circle"),
];

static COMPILED_RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn compiled_rules() -> &'static [(Regex, &'static str)] {
    COMPILED_RULES.get_or_init(|| {
        KEYWORD_RULES
            .iter()
            .filter_map(|(pattern, icon)| {
                // 整词匹配：no 不命中 north，car 不命中 cardiology；词干自带 \w*
                Regex::new(&format!(r"(?i)\b(?:{pattern})(?:e?s)?\b"))
                    .ok()
                    .map(|re| (re, *icon))
            })
            .collect()
    })
}

/// 是否为词表内的图标名
pub fn is_valid_icon(name: &str) -> bool {
    ICON_VOCABULARY.contains(&name)
}

/// 把模型返回的图标名规整为词表写法（小写、空格/下划线改连字符、去掉 Icon 后缀）
pub fn canonical_icon_name(raw: &str) -> String {
    let lowered = raw.trim().trim_matches('"').to_lowercase();
    let dashed = lowered.replace(['_', ' '], "-");
    dashed
        .strip_suffix("-icon")
        .or_else(|| dashed.strip_suffix("icon"))
        .unwrap_or(&dashed)
        .trim_matches('-')
        .to_string()
}

/// 关键词 → 图标兜底映射
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultIconMapper;

impl DefaultIconMapper {
    pub fn new() -> Self {
        Self
    }

    /// 依次匹配关键词规则，全不命中时返回 DEFAULT_ICON
    pub fn icon_for(&self, title: &str) -> &'static str {
        compiled_rules()
            .iter()
            .find(|(re, _)| re.is_match(title))
            .map(|(_, icon)| *icon)
            .unwrap_or(DEFAULT_ICON)
    }

    /// 词表内则原样保留，否则按标题兜底
    pub fn validate_or_map(&self, candidate: &str, title: &str) -> String {
        let name = canonical_icon_name(candidate);
        if is_valid_icon(&name) {
            name
        } else {
            self.icon_for(title).to_string()
        }
    }
}

/// Emoji 是否可用：非空、足够短、不含 ASCII 字母数字
pub fn is_valid_emoji(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= 8
        && !trimmed.chars().any(|c| c.is_ascii_alphanumeric())
}
