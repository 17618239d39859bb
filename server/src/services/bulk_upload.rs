use reqwest::multipart::{Form, Part};
use types::bulk::{BulkJob, NewUpload, OperationType};
use types::{Page, Result};
use uuid::Uuid;

use crate::client::{Download, ReqwestExt, TalentClient};

pub struct BulkUploads<'a>(pub(crate) &'a TalentClient);

impl BulkUploads<'_> {
    pub async fn list(&self) -> Result<Page<BulkJob>> {
        self.0.get("bulk-upload/")?.try_send().await
    }

    pub async fn get(&self, id: Uuid) -> Result<BulkJob> {
        self.0.get(format!("bulk-upload/{id}/"))?.try_send().await
    }

    /// Upload a file as `multipart/form-data`.
    pub async fn create(&self, upload: &NewUpload) -> Result<BulkJob> {
        let file = Part::bytes(upload.file.bytes()?)
            .file_name(upload.file.name.clone())
            .mime_str(upload.file.content_type())?;

        let mut form = Form::new()
            .text("operation_type", upload.operation_type.as_str())
            .part("file", file);
        if let Some(company) = upload.company {
            form = form.text("company", company.to_string());
        }

        self.0
            .post("bulk-upload/")?
            .multipart(form)
            .try_send()
            .await
    }

    /// Only failed or partially completed jobs can be retried.
    pub async fn retry(&self, id: Uuid) -> Result<BulkJob> {
        self.0
            .post(format!("bulk-upload/{id}/retry/"))?
            .try_send()
            .await
    }

    pub async fn download_template(&self, operation: OperationType) -> Result<Download> {
        let response = self
            .0
            .get("bulk-upload/download_template/")?
            .query(&[("type", operation.as_str())])
            .try_send_raw()
            .await?;

        let mut download = Download::from_response(response).await?;
        download
            .file_name
            .get_or_insert_with(|| operation.template_file_name());
        Ok(download)
    }
}
