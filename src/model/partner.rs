use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::partner::backend::Access;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PartnerSummary {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IssuePartner {
    pub name: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PartnerDetails {
    pub code: String,
    pub name: String,
    pub projects: BTreeMap<i32, String>,  // 프로젝트 ID -> 프로젝트 이름
}

/// 이슈 파트너 재지정 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PartnerSelection {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PartnerProjectsUpdateRequest {
    #[serde(default)]
    pub projects: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssuePartnersSelectRequest {
    #[serde(default, deserialize_with = "partner_codes_or_empty")]
    pub partners: Vec<String>,
}

/// 배열이 아닌 값은 빈 목록으로 취급한다.
fn partner_codes_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAccessResponse {
    pub par_code: Option<String>,
    pub access: Access,
}

#[cfg(test)]
mod tests {
    use super::IssuePartnersSelectRequest;

    #[test]
    fn non_array_partner_selection_is_treated_as_empty() {
        let missing: IssuePartnersSelectRequest = serde_json::from_str("{}").unwrap();
        let scalar: IssuePartnersSelectRequest = serde_json::from_str(r#"{"partners": "acme"}"#).unwrap();
        let null: IssuePartnersSelectRequest = serde_json::from_str(r#"{"partners": null}"#).unwrap();
        let list: IssuePartnersSelectRequest = serde_json::from_str(r#"{"partners": ["acme", "globex"]}"#).unwrap();

        assert!(missing.partners.is_empty());
        assert!(scalar.partners.is_empty());
        assert!(null.partners.is_empty());
        assert_eq!(list.partners, vec!["acme".to_string(), "globex".to_string()]);
    }
}
