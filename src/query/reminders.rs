use std::rc::Rc;

use super::cache::{QueryClient, Subscription};
use super::keys::{self, QueryKey};
use crate::api::{RemindersApi, Transport};
use crate::core::{ActionMessage, Reminder, ReminderFormData, ReminderPatch};
use crate::error::ApiError;

/// Keys touched by any reminder mutation, including completion, which
/// refreshes the whole dashboard even though it never changes the contact
/// total.
pub fn affected_keys() -> [QueryKey; 2] {
    [keys::reminders(), keys::dashboard()]
}

#[derive(Clone)]
pub struct ReminderQueries<T> {
    cache: QueryClient,
    api: RemindersApi<T>,
}

impl<T: Transport> ReminderQueries<T> {
    pub fn new(cache: QueryClient, api: RemindersApi<T>) -> Self {
        Self { cache, api }
    }

    pub async fn list(&self) -> Result<Rc<Vec<Reminder>>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::reminders(), move || {
                let api = api.clone();
                async move { api.list().await }
            })
            .await
    }

    pub async fn upcoming(&self) -> Result<Rc<Vec<Reminder>>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::upcoming_reminders(), move || {
                let api = api.clone();
                async move { api.upcoming().await }
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Rc<Reminder>>, ApiError> {
        let api = self.api.clone();
        let owned = id.to_string();
        self.cache
            .read_if(&keys::reminder(id), !id.is_empty(), move || {
                let api = api.clone();
                let id = owned.clone();
                async move { api.get(&id).await }
            })
            .await
    }

    pub fn watch_list(&self) -> Subscription {
        let api = self.api.clone();
        self.cache.subscribe_with(&keys::reminders(), move || {
            let api = api.clone();
            async move { api.list().await }
        })
    }

    pub async fn create(&self, data: &ReminderFormData) -> Result<Reminder, ApiError> {
        let reminder = self.cache.mutate(self.api.create(data), &affected_keys()).await?;
        log::info!("Created reminder {} for {}", reminder.id, reminder.contact);
        Ok(reminder)
    }

    pub async fn update(&self, id: &str, patch: &ReminderPatch) -> Result<Reminder, ApiError> {
        let reminder = self
            .cache
            .mutate(self.api.update(id, patch), &affected_keys())
            .await?;
        log::info!("Updated reminder {}", id);
        Ok(reminder)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.cache.mutate(self.api.delete(id), &affected_keys()).await?;
        log::info!("Deleted reminder {}", id);
        Ok(())
    }

    /// Mark a reminder done. Any follow-up occurrence is the server's
    /// business and shows up on the next list read.
    pub async fn complete(&self, id: &str) -> Result<ActionMessage, ApiError> {
        let msg = self.cache.mutate(self.api.complete(id), &affected_keys()).await?;
        log::info!("Completed reminder {}", id);
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContactType, ReminderFrequency};
    use crate::query::Freshness;
    use crate::testing::FakeApi;
    use chrono::NaiveDate;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()
    }

    #[tokio::test]
    async fn complete_invalidates_reminders_and_dashboard() {
        let fake = FakeApi::new();
        let contact = fake.add_contact("Ada", "", ContactType::Friend);
        let id = fake.add_reminder(&contact, "Coffee", due(), ReminderFrequency::Weekly);
        let cache = QueryClient::new();
        let reminders = ReminderQueries::new(cache.clone(), RemindersApi::new(fake.clone()));

        reminders.list().await.unwrap();
        reminders.upcoming().await.unwrap();
        cache.read(&keys::dashboard_stats(), || async { Ok::<_, ApiError>(0u32) }).await.unwrap();

        reminders.complete(&id).await.unwrap();

        assert_eq!(cache.freshness(&keys::reminders()), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&keys::upcoming_reminders()), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&keys::dashboard_stats()), Some(Freshness::Stale));

        let list = reminders.list().await.unwrap();
        assert!(list[0].completed);
        assert!(reminders.upcoming().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_leaves_list_untouched() {
        let fake = FakeApi::new();
        let contact = fake.add_contact("Ada", "", ContactType::Friend);
        let id = fake.add_reminder(&contact, "Coffee", due(), ReminderFrequency::None);
        let cache = QueryClient::new();
        let reminders = ReminderQueries::new(cache.clone(), RemindersApi::new(fake.clone()));

        reminders.list().await.unwrap();
        fake.fail_next(500, None);
        let err = reminders.delete(&id).await.unwrap_err();
        assert_eq!(err.message, "Request failed: 500");
        assert_eq!(cache.freshness(&keys::reminders()), Some(Freshness::Fresh));
        assert_eq!(reminders.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn watched_list_sees_new_reminder() {
        let fake = FakeApi::new();
        let contact = fake.add_contact("Ada", "", ContactType::Friend);
        let cache = QueryClient::new();
        let reminders = ReminderQueries::new(cache, RemindersApi::new(fake.clone()));

        let sub = reminders.watch_list();
        reminders
            .create(&ReminderFormData {
                contact: contact.clone(),
                title: "Birthday call".to_string(),
                due_date: due(),
                frequency: ReminderFrequency::Yearly,
            })
            .await
            .unwrap();

        let list = sub.current::<Vec<Reminder>>().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].contact_name, "Ada");
    }

    #[tokio::test]
    async fn complete_with_no_content_still_invalidates() {
        let fake = FakeApi::new();
        let contact = fake.add_contact("Ada", "", ContactType::Friend);
        let id = fake.add_reminder(&contact, "Coffee", due(), ReminderFrequency::None);
        let cache = QueryClient::new();
        let reminders = ReminderQueries::new(cache.clone(), RemindersApi::new(fake.clone()));

        reminders.list().await.unwrap();
        fake.empty_next();
        reminders.complete(&id).await.unwrap();

        assert_eq!(cache.freshness(&keys::reminders()), Some(Freshness::Stale));
        assert!(reminders.list().await.unwrap()[0].completed);
    }
}
