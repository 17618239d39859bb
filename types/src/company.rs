use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::de;
use crate::page::{QueryPairs, push_pair};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub registration_number: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub contact_person: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub email: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub address: String,
    #[serde(default)]
    pub registration_date: Option<Date>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub departments: Vec<Department>,
}

/// Body for creating or updating a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub registration_number: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub registration_date: Option<Date>,
    pub employee_count: Option<u32>,
}

impl NewCompany {
    /// Fields the form refuses to submit without, by label.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Company Name", &self.name),
            ("Registration Number", &self.registration_number),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

impl From<&Company> for NewCompany {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            registration_number: company.registration_number.clone(),
            contact_person: company.contact_person.clone(),
            email: company.email.clone(),
            phone: company.phone.clone(),
            address: company.address.clone(),
            registration_date: company.registration_date,
            employee_count: company.employee_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyQuery {
    pub search: String,
    pub page: Option<u32>,
}

impl QueryPairs for CompanyQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", &self.search);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_company() {
        let company: Company = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "Acme",
                "registration_date": "2019-04-01",
                "registration_number": "REG-001",
                "address": null,
                "contact_person": "Jo",
                "phone": "",
                "email": "hr@acme.test",
                "employee_count": 12,
                "created_at": "2024-01-01T00:00:00Z",
                "departments": [{"id": 1, "name": "Finance", "created_at": "2024-01-01T00:00:00Z"}]
            }"#,
        )
        .unwrap();

        assert_eq!(company.address, "");
        assert_eq!(company.registration_date, Some(jiff::civil::date(2019, 4, 1)));
        assert_eq!(company.departments[0].name, "Finance");
    }

    #[test]
    fn required_fields() {
        let mut form = NewCompany::default();
        assert_eq!(
            form.missing_fields(),
            vec!["Company Name", "Registration Number"]
        );

        form.name = "Acme".into();
        form.registration_number = "  ".into();
        assert_eq!(form.missing_fields(), vec!["Registration Number"]);
    }

    #[test]
    fn query_skips_blank_search() {
        let query = CompanyQuery {
            search: "  ".into(),
            page: Some(2),
        };
        assert_eq!(query.query_pairs(), vec![("page", "2".to_string())]);
    }
}
