use std::sync::Arc;

use crate::errors::{AppError, Entity};
use crate::models::{
    Booking, BookingInfo, CommentView, Item, ItemPatch, ItemView, NewComment, NewItem,
};
use crate::services::clock::Clock;
use crate::services::ports::{BookingStore, CommentStore, ItemCatalog, UserDirectory};
use crate::services::summary::SummaryResolver;

/// Item catalog and reviews. Owner-facing reads are enriched with the
/// item's last and next approved booking.
pub struct ItemService {
    users: Arc<dyn UserDirectory>,
    items: Arc<dyn ItemCatalog>,
    bookings: Arc<dyn BookingStore>,
    comments: Arc<dyn CommentStore>,
    clock: Arc<dyn Clock>,
    summaries: SummaryResolver,
}

impl ItemService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        items: Arc<dyn ItemCatalog>,
        bookings: Arc<dyn BookingStore>,
        comments: Arc<dyn CommentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let summaries = SummaryResolver::new(bookings.clone(), clock.clone());
        Self {
            users,
            items,
            bookings,
            comments,
            clock,
            summaries,
        }
    }

    pub async fn create(&self, item: NewItem) -> Result<ItemView, AppError> {
        if !self.users.user_exists(item.owner_id).await? {
            return Err(AppError::NotFound(Entity::User, item.owner_id));
        }
        validate_name(&item.name)?;

        let item = self.items.create_item(item).await?;
        tracing::info!(item_id = item.id, owner_id = item.owner_id, "item listed");
        Ok(ItemView::bare(item))
    }

    /// Booking summaries are only disclosed to the owner.
    pub async fn get(&self, id: i64, requester: Option<i64>) -> Result<ItemView, AppError> {
        let item = self.require_item(id).await?;
        let with_summary = requester == Some(item.owner_id);
        self.enrich(item, with_summary).await
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ItemView>, AppError> {
        if !self.users.user_exists(owner_id).await? {
            return Err(AppError::NotFound(Entity::User, owner_id));
        }

        let items = self.items.items_by_owner(owner_id).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.enrich(item, true).await?);
        }
        Ok(views)
    }

    pub async fn update(
        &self,
        id: i64,
        patch: ItemPatch,
        owner_id: i64,
    ) -> Result<ItemView, AppError> {
        let mut item = self.require_item(id).await?;
        if item.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "only the owner can edit an item".to_string(),
            ));
        }

        if let Some(name) = patch.name {
            validate_name(&name)?;
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = Some(description);
        }
        if let Some(available) = patch.available {
            item.available = available;
        }

        if !self.items.update_item(&item).await? {
            return Err(AppError::NotFound(Entity::Item, id));
        }
        Ok(ItemView::bare(item))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.items.delete_item(id).await? {
            tracing::info!(item_id = id, "item deleted");
        }
        Ok(())
    }

    pub async fn search(&self, text: &str) -> Result<Vec<ItemView>, AppError> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        let items = self.items.search(text).await?;
        Ok(items.into_iter().map(ItemView::bare).collect())
    }

    /// Only users with a finished booking of the item may review it.
    pub async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        text: String,
    ) -> Result<CommentView, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("comment text must not be blank".to_string()));
        }
        let item = self.require_item(item_id).await?;
        let author = self
            .users
            .get_user(author_id)
            .await?
            .ok_or(AppError::NotFound(Entity::User, author_id))?;

        let now = self.clock.now();
        let finished = self
            .bookings
            .query_by_item(item.id, &|b: &Booking| b.booker_id == author_id && b.end < now)
            .await?;
        if finished.is_empty() {
            return Err(AppError::Validation(
                "user has not finished a booking of this item".to_string(),
            ));
        }

        let id = self
            .comments
            .save_comment(NewComment {
                item_id: item.id,
                author_id,
                text: text.clone(),
                created: now,
            })
            .await?;

        tracing::info!(comment_id = id, item_id, author_id, "comment added");
        Ok(CommentView {
            id,
            text,
            author_name: author.name,
            created: now,
        })
    }

    async fn enrich(&self, item: Item, with_summary: bool) -> Result<ItemView, AppError> {
        let comments = self.comments.comments_for_item(item.id).await?;
        let summary = if with_summary {
            self.summaries.last_and_next(item.id).await?
        } else {
            Default::default()
        };

        let mut view = ItemView::bare(item);
        view.last_booking = summary.last.as_ref().map(booking_info);
        view.next_booking = summary.next.as_ref().map(booking_info);
        view.comments = comments;
        Ok(view)
    }

    async fn require_item(&self, id: i64) -> Result<Item, AppError> {
        self.items
            .get_item(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Item, id))
    }
}

fn booking_info(booking: &Booking) -> BookingInfo {
    BookingInfo {
        id: booking.id,
        booker_id: booking.booker_id,
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("item name must not be blank".to_string()));
    }
    Ok(())
}
