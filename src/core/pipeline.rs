use crate::config::AppConfig;
use crate::core::joiner::{join_days, join_specials, unresolved_special_refs, MenuIndex};
use crate::core::transport::{encode_with_fallback, PdfPayload, SerializationStrategy};
use crate::domain::model::{MenuData, MenuItem, Record};
use crate::domain::ports::{CollectionReader, Pipeline};
use crate::layout::{DocumentAssembler, RenderedDocument};
use crate::utils::error::{MenuPdfError, Result};

/// 從 CMS 讀取三個 collection，組版後序列化成 PDF
pub struct MenuPdfPipeline<C: CollectionReader> {
    reader: C,
    config: AppConfig,
}

impl<C: CollectionReader> MenuPdfPipeline<C> {
    pub fn new(reader: C, config: AppConfig) -> Self {
        Self { reader, config }
    }

    /// specials 參考到但不在列表中的 menu，逐一以 id 補抓
    async fn resolve_stragglers(&self, specials: &[Record], index: &mut MenuIndex) -> Result<()> {
        let menus = self.config.cms.collections.menus.as_str();
        let fetch = |id: Option<String>| async move {
            match id {
                Some(id) => self.reader.get_item(menus, &id).await,
                None => Ok(None),
            }
        };

        for [first, second] in unresolved_special_refs(specials, index) {
            // 前一個 special 可能已補抓過同一筆
            let first = first.filter(|id| !index.contains(id));
            let second = second.filter(|id| !index.contains(id) && Some(id) != first.as_ref());
            if first.is_none() && second.is_none() {
                continue;
            }

            tracing::debug!("🔍 Fetching unlisted menus: {:?}, {:?}", first, second);
            let (first, second) = tokio::join!(fetch(first), fetch(second));

            for record in [first?, second?].into_iter().flatten() {
                index.insert(MenuItem::from_record(&record));
            }
        }

        Ok(())
    }
}

fn ensure_present(records: &[Record], collection: &str) -> Result<()> {
    if records.is_empty() {
        return Err(MenuPdfError::MissingData {
            collection: collection.to_string(),
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl<C: CollectionReader> Pipeline for MenuPdfPipeline<C> {
    async fn extract(&self) -> Result<MenuData> {
        let collections = &self.config.cms.collections;
        tracing::info!(
            "🚀 Fetching collections: days={}, menus={}, specials={}",
            collections.days,
            collections.menus,
            collections.specials
        );

        let (days, menus, specials) = tokio::try_join!(
            self.reader.list_items(&collections.days),
            self.reader.list_items(&collections.menus),
            self.reader.list_items(&collections.specials),
        )?;

        tracing::info!(
            "📥 Fetched {} day(s), {} menu(s), {} special(s)",
            days.len(),
            menus.len(),
            specials.len()
        );

        Ok(MenuData {
            days,
            menus,
            specials,
        })
    }

    async fn transform(&self, data: MenuData) -> Result<RenderedDocument> {
        ensure_present(&data.days, "days")?;
        ensure_present(&data.menus, "menus")?;

        let mut index = MenuIndex::from_records(&data.menus);
        self.resolve_stragglers(&data.specials, &mut index).await?;

        let days = join_days(&data.days, &index);
        let specials = join_specials(&data.specials, &index);
        tracing::info!(
            "🔗 Joined {} day(s) and {} special(s) against {} menu(s)",
            days.len(),
            specials.len(),
            index.len()
        );

        DocumentAssembler::new(&self.config.document, &self.config.layout).assemble(&days, &specials)
    }

    async fn load(&self, document: RenderedDocument) -> Result<PdfPayload> {
        encode_with_fallback(&document, &SerializationStrategy::DEFAULT_ORDER)
    }
}
