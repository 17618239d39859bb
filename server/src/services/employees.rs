use types::employee::{
    Employee, EmployeeAnalytics, EmployeeExport, EmployeeFilters, EmployeeHistory, NewEmployee,
    NewPosition, Position,
};
use types::{Page, QueryPairs, Result};

use crate::client::{ReqwestExt, TalentClient};

pub struct Employees<'a>(pub(crate) &'a TalentClient);

impl Employees<'_> {
    pub async fn list(&self, filters: &EmployeeFilters) -> Result<Page<Employee>> {
        self.0
            .get("employees/")?
            .query(&filters.query_pairs())
            .try_send()
            .await
    }

    pub async fn create(&self, employee: &NewEmployee) -> Result<Employee> {
        self.0.post("employees/")?.json(employee).try_send().await
    }

    pub async fn update(&self, id: i64, employee: &NewEmployee) -> Result<Employee> {
        self.0
            .put(format!("employees/{id}/"))?
            .json(employee)
            .try_send()
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete(format!("employees/{id}/"))?.try_send().await
    }

    pub async fn history(&self, id: i64) -> Result<EmployeeHistory> {
        self.0
            .get(format!("employees/{id}/history/"))?
            .try_send()
            .await
    }

    /// The backend closes the current position, if any, as of the new start date.
    pub async fn add_position(&self, id: i64, position: &NewPosition) -> Result<Position> {
        self.0
            .post(format!("employees/{id}/add_position/"))?
            .json(position)
            .try_send()
            .await
    }

    pub async fn analytics(&self) -> Result<EmployeeAnalytics> {
        self.0.get("employees/analytics/")?.try_send().await
    }

    /// Export every employee matching `filters`; paging is ignored.
    pub async fn export(&self, filters: &EmployeeFilters) -> Result<EmployeeExport> {
        let pairs: Vec<_> = filters
            .query_pairs()
            .into_iter()
            .filter(|(key, _)| !matches!(*key, "page" | "page_size"))
            .collect();

        self.0
            .get("employees/export/")?
            .query(&pairs)
            .try_send()
            .await
    }
}
