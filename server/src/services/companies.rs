use types::company::{Company, CompanyQuery, NewCompany};
use types::{Page, QueryPairs, Result};

use crate::client::{ReqwestExt, TalentClient};

pub struct Companies<'a>(pub(crate) &'a TalentClient);

impl Companies<'_> {
    pub async fn list(&self, query: &CompanyQuery) -> Result<Page<Company>> {
        self.0
            .get("companies/")?
            .query(&query.query_pairs())
            .try_send()
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Company> {
        self.0.get(format!("companies/{id}/"))?.try_send().await
    }

    pub async fn create(&self, company: &NewCompany) -> Result<Company> {
        self.0.post("companies/")?.json(company).try_send().await
    }

    pub async fn update(&self, id: i64, company: &NewCompany) -> Result<Company> {
        self.0
            .put(format!("companies/{id}/"))?
            .json(company)
            .try_send()
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete(format!("companies/{id}/"))?.try_send().await
    }
}
