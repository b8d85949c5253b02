use serde::{Deserialize, Serialize};

/// Writable columns of a `phones` row, keyed by extension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneInput {
    pub extension: String,
    pub dialplan_number: String,
    pub voicemail_ext: String,
    pub phone_ip: String,
    pub computer_ip: String,
    pub server_ip: String,
    pub login: String,
    #[serde(skip_serializing)]
    pub pass: String,
    pub status: String,
    pub active: String,
    pub phone_type: String,
    pub fullname: String,
    pub company: String,
    pub outbound_cid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhoneAliasInput {
    pub alias_id: String,
    pub alias_name: String,
    /// Stored in `logins_list`
    pub extension: String,
    pub active: String,
}

/// Writable columns of a `vicidial_inbound_dids` row
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DidInput {
    pub did_pattern: String,
    pub did_description: String,
    pub did_route: String,
    pub record_call: String,
    pub extension: String,
    pub exten: String,
    pub voicemail_ext: String,
    pub filter_inbound_group: String,
    /// Stored in `group_id`
    pub group: String,
    pub user: String,
    pub active: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_password_is_never_echoed() {
        let phone: PhoneInput =
            serde_json::from_str(r#"{"extension":"1001","pass":"s3cret"}"#).unwrap();
        assert_eq!(phone.pass, "s3cret");
        let json = serde_json::to_value(&phone).unwrap();
        assert!(json.get("pass").is_none());
        assert_eq!(json["extension"], "1001");
    }

    #[test]
    fn did_group_maps_from_json_name() {
        let did: DidInput = serde_json::from_str(r#"{"did_pattern":"8005551212","group":"SALESLINE"}"#).unwrap();
        assert_eq!(did.group, "SALESLINE");
        assert!(did.active.is_empty());
    }
}
