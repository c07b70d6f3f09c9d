//! Code-to-label mapping for the post classification dimensions.
//!
//! Lookups never fail: a code with no entry maps to itself.

use serde::{Deserialize, Serialize};

use crate::types::{ConvertedPost, RawPost};

/// Classification dimension of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    EventSubject,
    EventNature,
    /// Multi-valued.
    EventScope,
    PostStance,
    InfoType,
    Emotion,
    Platform,
    InfoAttribute,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::EventSubject,
        Dimension::EventNature,
        Dimension::EventScope,
        Dimension::PostStance,
        Dimension::InfoType,
        Dimension::Emotion,
        Dimension::Platform,
        Dimension::InfoAttribute,
    ];

    pub fn is_multi_valued(self) -> bool {
        matches!(self, Dimension::EventScope)
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Dimension::EventSubject => EVENT_SUBJECT,
            Dimension::EventNature => EVENT_NATURE,
            Dimension::EventScope => EVENT_SCOPE,
            Dimension::PostStance => POST_STANCE,
            Dimension::InfoType => INFO_TYPE,
            Dimension::Emotion => EMOTION,
            Dimension::Platform => PLATFORM,
            Dimension::InfoAttribute => INFO_ATTRIBUTE,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EventSubject => "event_subject",
            Self::EventNature => "event_nature",
            Self::EventScope => "event_scope",
            Self::PostStance => "post_stance",
            Self::InfoType => "info_type",
            Self::Emotion => "emotion",
            Self::Platform => "platform",
            Self::InfoAttribute => "info_attribute",
        };
        write!(f, "{s}")
    }
}

const EVENT_SUBJECT: &[(&str, &str)] = &[
    ("A", "政府与公共机构"),
    ("B", "企业与商业组织"),
    ("C", "社会名人与公众人物"),
    ("D", "普通民众个体或群体"),
    ("E", "非营利组织或社会团体"),
];

const EVENT_NATURE: &[(&str, &str)] = &[
    ("A", "时事政治热点"),
    ("B", "重大公共安全事件"),
    ("C", "公权力领域负面事件"),
    ("D", "社会经济热点事件"),
    ("E", "企业违法违规行为"),
    ("F", "民生领域突出问题"),
    ("G", "价值观念偏差问题"),
];

const EVENT_SCOPE: &[(&str, &str)] = &[
    ("A", "时间：近期/今日/具体日期/无"),
    ("B", "地点：本市/全国/全球/无"),
];

const POST_STANCE: &[(&str, &str)] = &[
    ("A", "批判质疑"),
    ("B", "支持赞同"),
    ("C", "客观陈述"),
    ("D", "求助呼吁"),
    ("E", "调侃戏谑"),
    ("F", "疑问探究"),
];

const INFO_TYPE: &[(&str, &str)] = &[
    ("A", "事实陈述与爆料"),
    ("B", "个人观点与评论"),
    ("C", "谣言与不实信息"),
    ("D", "官方通报与澄清"),
    ("E", "情感宣泄与表达"),
];

const EMOTION: &[(&str, &str)] = &[
    ("F1", "中性"),
    ("F2", "喜悦"),
    ("F3", "愤怒"),
    ("F4", "悲伤"),
    ("F5", "惊奇"),
    ("F6", "恐惧"),
];

const PLATFORM: &[(&str, &str)] = &[
    ("DY", "抖音"),
    ("XHS", "小红书"),
    ("WYXW", "微信官方账号"),
    ("JRTT", "今日头条"),
    ("VX", "微信"),
];

const INFO_ATTRIBUTE: &[(&str, &str)] = &[
    ("敏感", "敏感信息"),
    ("非敏感", "非敏感信息"),
    ("中性", "中性信息"),
];

/// Label for `code` under `dimension`, or `code` itself when unmapped.
pub fn map_label<'a>(dimension: Dimension, code: &'a str) -> &'a str {
    dimension
        .table()
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Map every code independently, keeping order. Unmapped codes pass through.
pub fn map_labels(dimension: Dimension, codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|code| map_label(dimension, code).to_string())
        .collect()
}

fn map_opt(dimension: Dimension, code: &Option<String>) -> Option<String> {
    code.as_deref().map(|c| map_label(dimension, c).to_string())
}

/// Replace every classification code of `raw` with its label.
pub fn convert_post(raw: &RawPost) -> ConvertedPost {
    ConvertedPost {
        post_id: raw.post_id.clone(),
        platform: map_opt(Dimension::Platform, &raw.platform),
        event_subject: map_opt(Dimension::EventSubject, &raw.event_subject),
        event_nature: map_opt(Dimension::EventNature, &raw.event_nature),
        event_scope: map_labels(Dimension::EventScope, &raw.event_scope),
        stance: map_opt(Dimension::PostStance, &raw.stance),
        info_type: map_opt(Dimension::InfoType, &raw.info_type),
        emotion: map_opt(Dimension::Emotion, &raw.emotion),
        info_attribute: map_opt(Dimension::InfoAttribute, &raw.info_attribute),
        user_id: raw.user_id.clone(),
        propagation_effect: raw.propagation_effect,
    }
}

/// Short "who did what" phrase built from the subject and nature codes.
pub fn qualitative_summary(raw: &RawPost) -> String {
    let subject = match raw.event_subject.as_deref() {
        Some("A") => "政府",
        Some("B") => "企业",
        Some("C") => "名人",
        Some("D") => "民众",
        Some("E") => "组织",
        _ => "主体",
    };
    let nature = match raw.event_nature.as_deref() {
        Some("A") => "发布政策",
        Some("B") => "发生事故",
        Some("C") => "涉嫌违规",
        Some("D") => "开展活动",
        Some("E") => "违规经营",
        Some("F") => "存在问题",
        Some("G") => "行为不当",
        _ => "进行活动",
    };
    format!("{subject}{nature}")
}
