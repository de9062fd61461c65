use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::phone_category::Model as PhoneCategoryModel;
use crate::entity::phone_support::{CallType, Model as PhoneSupportModel};
use crate::entity::user_preference::Model as UserPreferenceModel;
use crate::model::global_error::{AppError, ValidationFieldError};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCallCreateRequest {
    pub category_id: i32,
    pub call_type: CallType,
    #[serde(default)]
    pub call_from: String,
    #[serde(default)]
    pub call_to: String,
    pub phone_number: String,
    pub phone_type: Option<String>,
    #[serde(default)]
    pub description: String,
    pub time_spent: Option<i32>,  // 분 단위
}

impl PhoneCallCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();

        if self.phone_number.trim().is_empty() {
            errors.push(field_error("phoneNumber", "전화번호를 입력해주세요"));
        }
        if self.description.trim().is_empty() {
            errors.push(field_error("description", "통화 내용을 입력해주세요"));
        }
        if matches!(self.time_spent, Some(minutes) if minutes < 0) {
            errors.push(field_error("timeSpent", "통화 시간은 0분 이상이어야 합니다"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(errors))
        }
    }
}

fn field_error(field: &str, message: &str) -> ValidationFieldError {
    ValidationFieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhoneCategoryResponse {
    pub id: i32,
    pub title: String,
}

impl From<PhoneCategoryModel> for PhoneCategoryResponse {
    fn from(model: PhoneCategoryModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceResponse {
    pub timezone: String,
    pub week_start: i32,
    pub close_popup_windows: bool,
}

impl From<UserPreferenceModel> for UserPreferenceResponse {
    fn from(model: UserPreferenceModel) -> Self {
        Self {
            timezone: model.timezone,
            week_start: model.week_start,
            close_popup_windows: model.close_popup_windows,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCallResponse {
    pub id: i32,
    pub category_id: i32,
    pub call_type: CallType,
    pub phone_number: String,
    pub description: String,
    pub time_spent: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<PhoneSupportModel> for PhoneCallResponse {
    fn from(model: PhoneSupportModel) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            call_type: model.call_type,
            phone_number: model.phone_number,
            description: model.description,
            time_spent: model.time_spent,
            created_at: model.created_at,
        }
    }
}

/// 통화 기록 화면에 필요한 값
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCallFormResponse {
    pub issue_id: i32,
    pub phone_categories: Vec<PhoneCategoryResponse>,
    pub current_user_prefs: UserPreferenceResponse,
    pub add_phone_result: Option<PhoneCallResponse>,
}

#[cfg(test)]
mod tests {
    use super::PhoneCallCreateRequest;
    use crate::model::global_error::AppError;

    #[test]
    fn blank_description_fails_validation() {
        let request: PhoneCallCreateRequest = serde_json::from_str(
            r#"{"categoryId": 1, "callType": "incoming", "phoneNumber": "010-1234-5678", "description": "  "}"#,
        )
        .unwrap();

        match request.validate() {
            Err(AppError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "description");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn complete_request_passes_validation() {
        let request: PhoneCallCreateRequest = serde_json::from_str(
            r#"{"categoryId": 1, "callType": "outgoing", "callFrom": "Kim", "callTo": "Acme",
                "phoneNumber": "010-1234-5678", "description": "장애 상황 공유", "timeSpent": 15}"#,
        )
        .unwrap();

        assert!(request.validate().is_ok());
    }
}
