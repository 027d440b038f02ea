//! Postal pincode lookup against the postalpincode.in API, used to
//! prefill city and state on checkout address forms.

use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Response shape of the upstream pincode API.
#[derive(Debug, Deserialize)]
pub struct PincodeApiResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "PostOffice", default)]
    pub post_offices: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
pub struct PostOffice {
    #[serde(rename = "District", default)]
    pub district: String,
    #[serde(rename = "Taluk", default)]
    pub taluk: String,
    #[serde(rename = "Circle", default)]
    pub circle: String,
    #[serde(rename = "State", default)]
    pub state: String,
}

/// Lookup result returned to the client.
///
/// # JSON Example
///
/// ```json
/// { "status": "success", "district": "Pune City", "state": "Maharashtra" }
/// ```
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PincodeLookup {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl PincodeLookup {
    fn failure() -> Self {
        Self {
            status: "failure",
            district: None,
            state: None,
        }
    }
}

/// Query the upstream API for a pincode.
pub async fn lookup(config: &Config, pincode: &str) -> Result<PincodeLookup, AppError> {
    if pincode.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Pincode cannot be empty".to_string(),
        ));
    }

    let url = format!("{}/{}", config.pincode_api_url, pincode.trim());
    let response: PincodeApiResponse = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?
        .get(&url)
        .send()
        .await?
        .json()
        .await?;

    Ok(extract_city_state(response))
}

/// Turn the upstream response into the client shape.
///
/// The district comes from the Taluk field unless the circle is
/// reported as `NA`, in which case the District field is used.
pub fn extract_city_state(response: PincodeApiResponse) -> PincodeLookup {
    if response.status == "Error" {
        return PincodeLookup::failure();
    }

    let Some(office) = response
        .post_offices
        .as_ref()
        .and_then(|offices| offices.first())
    else {
        return PincodeLookup::failure();
    };

    let district = if office.circle == "NA" {
        office.district.clone()
    } else {
        office.taluk.clone()
    };

    PincodeLookup {
        status: "success",
        district: Some(district),
        state: Some(office.state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, circle: &str) -> PincodeApiResponse {
        PincodeApiResponse {
            status: status.to_string(),
            post_offices: Some(vec![PostOffice {
                district: "Pune".to_string(),
                taluk: "Pune City".to_string(),
                circle: circle.to_string(),
                state: "Maharashtra".to_string(),
            }]),
        }
    }

    #[test]
    fn error_status_maps_to_failure() {
        let lookup = extract_city_state(response("Error", "Maharashtra"));
        assert_eq!(lookup, PincodeLookup::failure());
    }

    #[test]
    fn taluk_is_preferred_as_district() {
        let lookup = extract_city_state(response("Success", "Maharashtra"));
        assert_eq!(lookup.district.as_deref(), Some("Pune City"));
        assert_eq!(lookup.state.as_deref(), Some("Maharashtra"));
        assert_eq!(lookup.status, "success");
    }

    #[test]
    fn na_circle_falls_back_to_district_field() {
        let lookup = extract_city_state(response("Success", "NA"));
        assert_eq!(lookup.district.as_deref(), Some("Pune"));
    }

    #[test]
    fn missing_post_offices_map_to_failure() {
        let empty = PincodeApiResponse {
            status: "Success".to_string(),
            post_offices: None,
        };
        assert_eq!(extract_city_state(empty), PincodeLookup::failure());
    }
}
