use crate::domain::model::{MenuData, Record};
use crate::layout::RenderedDocument;
use crate::core::transport::PdfPayload;
use crate::utils::error::Result;
use async_trait::async_trait;

/// CMS 唯讀介面：列出 collection 項目、依 id 取得單一項目
pub trait CollectionReader: Send + Sync {
    fn list_items(
        &self,
        collection_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;

    /// 找不到項目時回傳 `Ok(None)`
    fn get_item(
        &self,
        collection_id: &str,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Record>>> + Send;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<MenuData>;
    async fn transform(&self, data: MenuData) -> Result<RenderedDocument>;
    async fn load(&self, document: RenderedDocument) -> Result<PdfPayload>;
}
