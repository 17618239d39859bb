use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::company::Department;
use crate::csv::CsvRecord;
use crate::de;
use crate::page::{QueryPairs, push_pair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Intern,
    Consultant,
}

impl EmploymentType {
    pub const ALL: [Self; 5] = [
        Self::FullTime,
        Self::PartTime,
        Self::Contract,
        Self::Intern,
        Self::Consultant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Intern => "intern",
            Self::Consultant => "consultant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full Time",
            Self::PartTime => "Part Time",
            Self::Contract => "Contract",
            Self::Intern => "Intern",
            Self::Consultant => "Consultant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub role: String,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub duties: String,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, deserialize_with = "de::decimal")]
    pub salary: Option<f64>,
    pub employment_type: EmploymentType,
    /// Length in days as computed by the backend.
    #[serde(default)]
    pub duration: Option<i64>,
}

impl Position {
    pub fn department_name(&self) -> &str {
        self.department.as_ref().map_or("", |d| d.name.as_str())
    }

    /// Open positions run until `today`.
    pub fn end_or(&self, today: Date) -> Date {
        self.end_date.unwrap_or(today)
    }

    /// Whole calendar days covered, never negative.
    pub fn days(&self, today: Date) -> i64 {
        days_between(self.start_date, self.end_or(today))
    }
}

fn days_between(start: Date, end: Date) -> i64 {
    start
        .until(end)
        .map(|span| i64::from(span.get_days()))
        .unwrap_or_default()
        .max(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub email: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub phone: String,
    #[serde(default)]
    pub company: Option<i64>,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_joined: Option<Timestamp>,
    #[serde(default)]
    pub current_position: Option<Position>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

fn default_true() -> bool {
    true
}

impl Employee {
    /// The backend's summary if it sent one, otherwise picked from the full list.
    pub fn current_position(&self) -> Option<&Position> {
        self.current_position
            .as_ref()
            .or_else(|| current_position(&self.positions))
    }

    pub fn current_role(&self) -> &str {
        self.current_position().map_or("", |p| p.role.as_str())
    }
}

/// The position flagged current, or failing that the one without an end date.
pub fn current_position(positions: &[Position]) -> Option<&Position> {
    positions
        .iter()
        .find(|p| p.is_current)
        .or_else(|| positions.iter().find(|p| p.end_date.is_none()))
}

/// Sum of each position's length. Overlapping positions count twice.
pub fn total_experience_days(positions: &[Position], today: Date) -> i64 {
    positions.iter().map(|p| p.days(today)).sum()
}

/// Days covered by at least one position.
pub fn distinct_experience_days(positions: &[Position], today: Date) -> i64 {
    let mut ranges: Vec<(Date, Date)> = positions
        .iter()
        .map(|p| (p.start_date, p.end_or(today)))
        .filter(|(start, end)| start < end)
        .collect();
    ranges.sort_unstable();

    let mut total = 0;
    let mut current: Option<(Date, Date)> = None;
    for (start, end) in ranges {
        current = match current {
            Some((cs, ce)) if start <= ce => Some((cs, ce.max(end))),
            Some((cs, ce)) => {
                total += days_between(cs, ce);
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((cs, ce)) = current {
        total += days_between(cs, ce);
    }

    total
}

/// Rough years/months for display: 365-day years and 30-day months.
pub fn format_duration(days: i64) -> String {
    let days = days.max(0);
    let years = days / 365;
    let months = (days % 365) / 30;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    match (years, months) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{}, {}", plural(y, "year"), plural(m, "month")),
    }
}

/// Response of `employees/{id}/history/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeHistory {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company_name: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub total_positions: Option<u32>,
    #[serde(default)]
    pub total_experience_days: Option<i64>,
}

impl EmployeeHistory {
    /// Positions newest first.
    pub fn timeline(&self) -> Vec<&Position> {
        let mut positions: Vec<&Position> = self.positions.iter().collect();
        positions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        positions
    }

    pub fn total_days(&self, today: Date) -> i64 {
        total_experience_days(&self.positions, today)
    }

    pub fn distinct_days(&self, today: Date) -> i64 {
        distinct_experience_days(&self.positions, today)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAnalytics {
    #[serde(default)]
    pub total_employees: u64,
    #[serde(default)]
    pub active_employees: u64,
    #[serde(default)]
    pub by_department: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_employment_type: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "de::decimal_or_zero")]
    pub average_tenure_days: f64,
}

/// Body for creating or updating an employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub employee_id: String,
    pub email: String,
    pub phone: String,
    pub company: Option<i64>,
    pub is_active: bool,
}

impl NewEmployee {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Name");
        }
        if self.company.is_none() {
            missing.push("Company");
        }
        missing
    }
}

impl From<&Employee> for NewEmployee {
    fn from(employee: &Employee) -> Self {
        Self {
            name: employee.name.clone(),
            employee_id: employee.employee_id.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            company: employee.company,
            is_active: employee.is_active,
        }
    }
}

/// Body for `employees/{id}/add_position/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosition {
    pub role: String,
    pub department_name: String,
    pub employment_type: EmploymentType,
    pub start_date: Option<Date>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub salary: Option<String>,
    pub duties: String,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

impl Default for NewPosition {
    fn default() -> Self {
        Self {
            role: String::new(),
            department_name: String::new(),
            employment_type: EmploymentType::FullTime,
            start_date: None,
            salary: None,
            duties: String::new(),
        }
    }
}

impl NewPosition {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.role.trim().is_empty() {
            missing.push("Role");
        }
        if self.department_name.trim().is_empty() {
            missing.push("Department");
        }
        if self.start_date.is_none() {
            missing.push("Start Date");
        }
        missing
    }

    /// Salary has to look like a number if it is given at all.
    pub fn salary_is_valid(&self) -> bool {
        self.salary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .is_none_or(|s| s.parse::<f64>().is_ok_and(|v| v >= 0.0))
    }
}

/// Filters accepted by `employees/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeFilters {
    pub search: String,
    pub name: String,
    pub company: Option<i64>,
    pub department: String,
    pub role: String,
    pub employment_type: Option<EmploymentType>,
    pub year_started: Option<i16>,
    pub year_left: Option<i16>,
    pub is_current: Option<bool>,
    pub experience_years: Option<u32>,
    pub page: u32,
    pub page_size: u32,
}

pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

impl Default for EmployeeFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            name: String::new(),
            company: None,
            department: String::new(),
            role: String::new(),
            employment_type: None,
            year_started: None,
            year_left: None,
            is_current: None,
            experience_years: None,
            page: 1,
            page_size: PAGE_SIZES[0],
        }
    }
}

impl EmployeeFilters {
    /// How many of the advanced filters are set. Search and paging don't count.
    pub fn active_count(&self) -> usize {
        [
            !self.name.trim().is_empty(),
            self.company.is_some(),
            !self.department.trim().is_empty(),
            !self.role.trim().is_empty(),
            self.employment_type.is_some(),
            self.year_started.is_some(),
            self.year_left.is_some(),
            self.is_current.is_some(),
            self.experience_years.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn cleared(&self) -> Self {
        Self {
            page_size: self.page_size,
            ..Self::default()
        }
    }
}

impl QueryPairs for EmployeeFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", &self.search);
        push_pair(&mut pairs, "name", &self.name);
        push_pair(&mut pairs, "department", &self.department);
        push_pair(&mut pairs, "role", &self.role);

        let optional = [
            ("company", self.company.map(|c| c.to_string())),
            (
                "employment_type",
                self.employment_type.map(|t| t.as_str().to_string()),
            ),
            ("year_started", self.year_started.map(|y| y.to_string())),
            ("year_left", self.year_left.map(|y| y.to_string())),
            ("is_current", self.is_current.map(|c| c.to_string())),
            (
                "experience_years",
                self.experience_years.map(|y| y.to_string()),
            ),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );

        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("page_size", self.page_size.to_string()));
        pairs
    }
}

/// Response of `employees/export/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeExport {
    pub data: Vec<ExportedEmployee>,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub exported_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedEmployee {
    pub name: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub email: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub company: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub current_role: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub current_department: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "de::null_string")]
    pub employment_type: String,
    #[serde(default)]
    pub is_active: bool,
}

impl CsvRecord for ExportedEmployee {
    const HEADERS: &'static [&'static str] = &[
        "Name",
        "Employee ID",
        "Email",
        "Phone",
        "Company",
        "Current Role",
        "Current Department",
        "Start Date",
        "Employment Type",
        "Active",
    ];

    fn fields(&self) -> Vec<String> {
        let employment_type = EmploymentType::parse(&self.employment_type)
            .map_or_else(|| self.employment_type.clone(), |t| t.label().to_string());

        vec![
            self.name.clone(),
            self.employee_id.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.company.clone(),
            self.current_role.clone(),
            self.current_department.clone(),
            self.start_date.clone(),
            employment_type,
            if self.is_active { "Yes" } else { "No" }.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn position(id: i64, start: Date, end: Option<Date>) -> Position {
        Position {
            id,
            role: "Analyst".into(),
            department: Some(Department {
                id: 1,
                name: "Finance".into(),
            }),
            duties: String::new(),
            start_date: start,
            end_date: end,
            is_current: end.is_none(),
            salary: None,
            employment_type: EmploymentType::FullTime,
            duration: None,
        }
    }

    #[test]
    fn sums_back_to_back_positions() {
        let positions = [
            position(1, date(2020, 1, 1), Some(date(2021, 1, 1))),
            position(2, date(2021, 1, 1), None),
        ];
        // 2020 is a leap year.
        assert_eq!(total_experience_days(&positions, date(2022, 1, 1)), 366 + 365);
        assert_eq!(distinct_experience_days(&positions, date(2022, 1, 1)), 731);
    }

    #[test]
    fn overlap_is_double_counted_in_total_only() {
        let positions = [
            position(1, date(2021, 1, 1), Some(date(2021, 7, 1))),
            position(2, date(2021, 4, 1), Some(date(2021, 10, 1))),
        ];
        let today = date(2022, 1, 1);
        assert_eq!(total_experience_days(&positions, today), 181 + 183);
        assert_eq!(distinct_experience_days(&positions, today), 273);
    }

    #[test]
    fn disjoint_ranges_merge_to_their_sum() {
        let positions = [
            position(1, date(2019, 1, 1), Some(date(2019, 1, 11))),
            position(2, date(2018, 1, 1), Some(date(2018, 1, 6))),
        ];
        assert_eq!(distinct_experience_days(&positions, date(2022, 1, 1)), 15);
    }

    #[test]
    fn future_positions_count_zero() {
        let positions = [position(1, date(2030, 1, 1), None)];
        assert_eq!(total_experience_days(&positions, date(2022, 1, 1)), 0);
        assert_eq!(distinct_experience_days(&positions, date(2022, 1, 1)), 0);
    }

    #[test]
    fn current_position_prefers_flag() {
        let mut old = position(1, date(2019, 1, 1), None);
        old.is_current = false;
        let current = position(2, date(2020, 1, 1), None);

        let positions = [old.clone(), current];
        assert_eq!(current_position(&positions).map(|p| p.id), Some(2));
        assert_eq!(current_position(&[old]).map(|p| p.id), Some(1));
        assert_eq!(current_position(&[]), None);
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0 months");
        assert_eq!(format_duration(45), "1 month");
        assert_eq!(format_duration(365), "1 year");
        assert_eq!(format_duration(365 * 2 + 95), "2 years, 3 months");
        assert_eq!(format_duration(-5), "0 months");
    }

    #[test]
    fn parses_position_with_string_salary() {
        let position: Position = serde_json::from_str(
            r#"{
                "id": 9,
                "department": {"id": 2, "name": "IT", "created_at": "2024-01-01T00:00:00Z"},
                "role": "Engineer",
                "duties": null,
                "start_date": "2022-03-01",
                "end_date": null,
                "is_current": true,
                "salary": "85000.00",
                "employment_type": "contract",
                "manager": null,
                "duration": 400
            }"#,
        )
        .unwrap();

        assert_eq!(position.salary, Some(85000.0));
        assert_eq!(position.employment_type, EmploymentType::Contract);
        assert_eq!(position.department_name(), "IT");
    }

    #[test]
    fn position_form_checks() {
        let mut form = NewPosition::default();
        assert_eq!(form.missing_fields(), vec!["Role", "Department", "Start Date"]);
        assert!(form.salary_is_valid());

        form.salary = Some("12,000".into());
        assert!(!form.salary_is_valid());
        form.salary = Some("12000.50".into());
        assert!(form.salary_is_valid());
    }

    #[test]
    fn blank_salary_is_not_sent() {
        let form = NewPosition {
            salary: Some(" ".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&form).unwrap();
        assert!(body.get("salary").is_none());
        assert_eq!(body["employment_type"], "full_time");
    }

    #[test]
    fn filter_query() {
        let filters = EmployeeFilters {
            name: "ann".into(),
            company: Some(4),
            employment_type: Some(EmploymentType::PartTime),
            is_current: Some(true),
            page: 2,
            page_size: 25,
            ..Default::default()
        };

        assert_eq!(filters.active_count(), 4);
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("name", "ann".to_string()),
                ("company", "4".to_string()),
                ("employment_type", "part_time".to_string()),
                ("is_current", "true".to_string()),
                ("page", "2".to_string()),
                ("page_size", "25".to_string()),
            ]
        );

        assert_eq!(
            filters.query_string(),
            "name=ann&company=4&employment_type=part_time&is_current=true&page=2&page_size=25"
        );

        let cleared = filters.cleared();
        assert_eq!(cleared.active_count(), 0);
        assert_eq!(cleared.page_size, 25);
        assert_eq!(cleared.page, 1);
    }

    #[test]
    fn filters_read_back_from_json_with_gaps() {
        let filters: EmployeeFilters =
            serde_json::from_str(r#"{"department": "Engineering"}"#).unwrap();
        assert_eq!(filters.department, "Engineering");
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, 10);
    }

    #[test]
    fn export_row_labels() {
        let row = ExportedEmployee {
            name: "Doe, Jane".into(),
            employment_type: "full_time".into(),
            is_active: true,
            ..Default::default()
        };
        let fields = row.fields();
        assert_eq!(fields.len(), ExportedEmployee::HEADERS.len());
        assert_eq!(fields[8], "Full Time");
        assert_eq!(fields[9], "Yes");
    }
}
