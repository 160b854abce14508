use reqwest::{
    Method,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Client, DocumentStatus, Error, RequestParams, Result, Visibility};

/// A file to send to `POST /api/documents/upload`.
///
/// The backend accepts PDF and PNG/JPEG images.
#[derive(Debug, Clone)]
pub struct UploadDocument {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub visibility: Option<Visibility>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub status: DocumentStatus,
    pub message: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct UpdateVisibilityDto {
    pub visibility: Visibility,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub total_chunks: u32,
    pub visibility: Visibility,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryDocumentDto {
    pub query: String,
    /// Number of chunks to retrieve, backend default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Restricts the search to these documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuerySource {
    pub document_id: String,
    pub document_name: String,
    pub chunk_index: u32,
    pub similarity: f64,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Deserialize, Debug, Clone)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub sources: Vec<QuerySource>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ListDocumentsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub total_chunks: u32,
    pub visibility: Visibility,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub user: serde_json::Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PaginatedDocuments {
    pub data: Vec<DocumentItem>,
    pub meta: PaginationMeta,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DocumentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub total_chunks: u32,
    pub visibility: Visibility,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user: DocumentUser,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DeleteResponse {
    pub message: String,
}

impl Client {
    /// `POST /api/documents/upload` as `multipart/form-data`.
    pub async fn upload_document(
        &self,
        token: &str,
        input: UploadDocument,
        params: RequestParams,
    ) -> Result<UploadResponse> {
        let file = Part::bytes(input.data)
            .file_name(input.file_name)
            .mime_str(&input.content_type)
            .map_err(|e| Error::Config(format!("invalid content type: {e}")))?;

        let mut form = Form::new().part("file", file);
        if let Some(visibility) = input.visibility {
            form = form.text("visibility", visibility.to_string());
        }

        let request = self
            .request(
                Method::POST,
                &["api", "documents", "upload"],
                Some(token),
                params,
            )?
            .multipart(form);

        self.send(request).await
    }

    /// `PATCH /api/documents/{id}/visibility`, owner only.
    pub async fn update_document_visibility(
        &self,
        token: &str,
        id: &str,
        input: &UpdateVisibilityDto,
        params: RequestParams,
    ) -> Result<DocumentResponse> {
        let request = self
            .request(
                Method::PATCH,
                &["api", "documents", id, "visibility"],
                Some(token),
                params,
            )?
            .json(input);

        self.send(request).await
    }

    /// `POST /api/documents/query`, answers a question from document chunks.
    pub async fn query_documents(
        &self,
        token: &str,
        input: &QueryDocumentDto,
        params: RequestParams,
    ) -> Result<QueryResponse> {
        let request = self
            .request(
                Method::POST,
                &["api", "documents", "query"],
                Some(token),
                params,
            )?
            .json(input);

        self.send(request).await
    }

    /// `GET /api/documents`
    pub async fn list_documents(
        &self,
        token: &str,
        query: &ListDocumentsQuery,
        params: RequestParams,
    ) -> Result<PaginatedDocuments> {
        let request = self
            .request(Method::GET, &["api", "documents"], Some(token), params)?
            .query(query);

        self.send(request).await
    }

    /// `GET /api/documents/{id}`
    pub async fn get_document_by_id(
        &self,
        token: &str,
        id: &str,
        params: RequestParams,
    ) -> Result<DocumentDetail> {
        let request = self.request(Method::GET, &["api", "documents", id], Some(token), params)?;

        self.send(request).await
    }

    /// `DELETE /api/documents/{id}`, removes the document and its chunks.
    pub async fn delete_document(
        &self,
        token: &str,
        id: &str,
        params: RequestParams,
    ) -> Result<DeleteResponse> {
        let request = self.request(
            Method::DELETE,
            &["api", "documents", id],
            Some(token),
            params,
        )?;

        self.send(request).await
    }
}
