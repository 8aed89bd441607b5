//! Turns failures into actionable, user-facing guidance.
//!
//! The mapping is data: an ordered rule table that can be replaced or loaded
//! from JSON. A rule is selected by the failure's HTTP status when one is
//! known, otherwise by keywords in the failure text; the first matching rule
//! wins in each pass.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceCategory {
    InvalidModel,
    InvalidCredential,
    QuotaExhausted,
    ServerBusy,
    Unknown,
}

/// One row of the table. `template` may use `{model_info}` and `{detail}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceRule {
    pub category: GuidanceCategory,
    #[serde(default)]
    pub statuses: Vec<u16>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub template: String,
}

impl GuidanceRule {
    fn matches_keyword(&self, detail: &str) -> bool {
        self.keywords.iter().any(|k| !k.is_empty() && detail.contains(k.as_str()))
    }
}

/// What is known about a failure when it reaches the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    pub status: Option<u16>,
    pub model: Option<String>,
    pub detail: String,
}

impl From<&AppError> for FailureReport {
    fn from(err: &AppError) -> Self {
        Self {
            status: err.status(),
            model: err.model().map(str::to_string),
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceTable {
    pub rules: Vec<GuidanceRule>,
    /// Used when no rule matches; may use `{detail}`.
    pub fallback: String,
    /// Used when the failure carries no text at all.
    pub empty_detail: String,
}

impl Default for GuidanceTable {
    fn default() -> Self {
        let rule = |category, statuses: &[u16], keywords: &[&str], template: &str| GuidanceRule {
            category,
            statuses: statuses.to_vec(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            template: template.to_string(),
        };

        Self {
            rules: vec![
                rule(
                    GuidanceCategory::InvalidModel,
                    &[404],
                    &["404"],
                    "错误 (404): 找不到该模型{model_info}。\n建议：请在设置中重新选择模型 (推荐 gemini-2.0-flash)。",
                ),
                rule(
                    GuidanceCategory::InvalidCredential,
                    &[401, 403],
                    &["403", "key"],
                    "错误 (403): API Key 无效。\n建议：请检查您的 Gemini API Key 是否正确。",
                ),
                rule(
                    GuidanceCategory::QuotaExhausted,
                    &[429],
                    &["429", "Quota", "quota"],
                    "错误 (429): 配额已用完或请求过于频繁。\n建议：请检查您的 Google Cloud 账户配额。",
                ),
                rule(
                    GuidanceCategory::ServerBusy,
                    &[500, 502, 503, 504],
                    &["500", "503", "5xx"],
                    "错误 (5xx): Google Gemini 服务器暂时繁忙。\n详情: {detail}\n建议：请稍后再试，或检查您的网络连接。",
                ),
            ],
            fallback: "错误详情: {detail}".to_string(),
            empty_detail: "抱歉，发生了未知错误。".to_string(),
        }
    }
}

impl GuidanceTable {
    pub fn new(rules: Vec<GuidanceRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn select(&self, report: &FailureReport) -> Option<&GuidanceRule> {
        let by_status = report
            .status
            .and_then(|s| self.rules.iter().find(|r| r.statuses.contains(&s)));
        by_status.or_else(|| self.rules.iter().find(|r| r.matches_keyword(&report.detail)))
    }

    pub fn classify(&self, report: &FailureReport) -> GuidanceCategory {
        self.select(report)
            .map(|r| r.category)
            .unwrap_or(GuidanceCategory::Unknown)
    }

    pub fn describe(&self, report: &FailureReport) -> String {
        if report.detail.trim().is_empty() && report.status.is_none() {
            return self.empty_detail.clone();
        }
        let template = self
            .select(report)
            .map(|r| r.template.as_str())
            .unwrap_or(self.fallback.as_str());
        let model_info = report
            .model
            .as_deref()
            .map(|m| format!(" (尝试使用的模型: {m})"))
            .unwrap_or_default();
        template
            .replace("{model_info}", &model_info)
            .replace("{detail}", &report.detail)
    }

    pub fn describe_error(&self, err: &AppError) -> String {
        self.describe(&FailureReport::from(err))
    }
}
