// ChiloDisco - core/labels.rs
//
// Human-readable text shown by the dashboard: display names for the known
// log keys, bucket labels and placeholders. Two label sets exist; the
// Chinese set matches the deployment the fuzzing pipeline was first run in.

use super::age::AgeBucket;

/// Which set of human-readable labels to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSet {
    #[default]
    English,
    Chinese,
}

/// Known log keys in display order of the table below.
const KNOWN_KEYS: [&str; 6] = [
    "LLM_LOG_PATH",
    "MAIN_LOG_PATH",
    "MUTATOR_FIXER_LOG_PATH",
    "MUTATOR_GENERATOR_LOG_PATH",
    "PARSER_LOG_PATH",
    "STRUCTURAL_MUTATOR_LOG_PATH",
];

const ENGLISH_NAMES: [&str; 6] = [
    "LLM log",
    "Main log",
    "Mutator fixer log",
    "Mutator generator log",
    "Parser log",
    "Structural mutator log",
];

const CHINESE_NAMES: [&str; 6] = [
    "LLM日志",
    "主日志",
    "修复日志",
    "生成器日志",
    "解析器日志",
    "结构变异日志",
];

impl LabelSet {
    /// Parse a config/CLI value (`english`/`en`, `chinese`/`zh`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "english" | "en" => Some(Self::English),
            "chinese" | "zh" => Some(Self::Chinese),
            _ => None,
        }
    }

    /// Display name for a log key; unknown keys are shown as-is.
    pub fn display_name<'a>(&self, key: &'a str) -> &'a str {
        let names = match self {
            Self::English => &ENGLISH_NAMES,
            Self::Chinese => &CHINESE_NAMES,
        };
        KNOWN_KEYS
            .iter()
            .position(|k| *k == key)
            .map_or(key, |i| names[i])
    }

    /// Label for a recency bucket.
    pub fn bucket_label(&self, bucket: AgeBucket) -> &'static str {
        match (self, bucket) {
            (Self::English, AgeBucket::UpTo2s) => "0\u{2013}2s",
            (Self::English, AgeBucket::UpTo5s) => "2\u{2013}5s",
            (Self::English, AgeBucket::UpTo10s) => "5\u{2013}10s",
            (Self::English, AgeBucket::UpTo20s) => "10\u{2013}20s",
            (Self::English, AgeBucket::UpTo40s) => "20\u{2013}40s",
            (Self::English, AgeBucket::UpTo60s) => "40\u{2013}60s",
            (Self::English, AgeBucket::UpTo90s) => "60\u{2013}90s",
            (Self::English, AgeBucket::Older) => "\u{2265}90s",
            (Self::Chinese, AgeBucket::UpTo2s) => "0\u{2013}2秒",
            (Self::Chinese, AgeBucket::UpTo5s) => "2\u{2013}5秒",
            (Self::Chinese, AgeBucket::UpTo10s) => "5\u{2013}10秒",
            (Self::Chinese, AgeBucket::UpTo20s) => "10\u{2013}20秒",
            (Self::Chinese, AgeBucket::UpTo40s) => "20\u{2013}40秒",
            (Self::Chinese, AgeBucket::UpTo60s) => "40\u{2013}60秒",
            (Self::Chinese, AgeBucket::UpTo90s) => "60\u{2013}90秒",
            (Self::Chinese, AgeBucket::Older) => "\u{2265}90秒",
        }
    }

    /// Body of a panel that has not been populated yet.
    pub fn loading(&self) -> &'static str {
        match self {
            Self::English => "(loading)",
            Self::Chinese => "(加载中...)",
        }
    }

    /// Body of a populated panel whose window holds no lines.
    pub fn empty(&self) -> &'static str {
        match self {
            Self::English => "(empty)",
            Self::Chinese => "(空)",
        }
    }

    /// Size text of a file the server reports as missing.
    pub fn missing(&self) -> &'static str {
        match self {
            Self::English => "missing",
            Self::Chinese => "不存在",
        }
    }
}
