//! Welcome-table model
//!
//! Daily support metrics shown on the dashboard landing page. The list
//! endpoint accepts pagination only, so its parameter type is the bare
//! [`PageQuery`](super::PageQuery).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the welcome table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeTableItem {
    pub id: u32,
    pub required_number: u32,
    pub question_number: u32,
    pub resolve_number: u32,
    /// Satisfaction percentage (0-100)
    pub satisfaction: u8,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_item_wire_names() {
        let item = WelcomeTableItem {
            id: 7,
            required_number: 16000,
            question_number: 1200,
            resolve_number: 1100,
            satisfaction: 99,
            date: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
        };
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["requiredNumber"], 16000);
        assert_eq!(value["resolveNumber"], 1100);
        assert_eq!(value["date"], "2024-05-07");
    }
}
