//! In-memory view of the exercise collection with optimistic mutations
//!
//! The manager mirrors the persisted collection and exposes the
//! create/delete/update operations the UI layer calls. Fast paths
//! (create, delete exercise) mutate the in-memory view first and
//! persist behind it; on a failed save the authoritative state is
//! reloaded from the store before the error is re-raised, so `items`
//! always reflects the last successfully persisted collection.
//!
//! Slow paths (title edit, session append/delete) re-read the
//! authoritative collection before writing, trading responsiveness
//! for correctness on less frequent operations.
//!
//! All mutations are serialized through one owner: methods take
//! `&mut self`, and the `is_saving` guard rejects any mutation that
//! would overlap an in-flight save.

use crate::error::{GymwatchError, Result};
use crate::model::{Collection, Exercise, Session, SetItem};
use crate::store::CollectionStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one optimistic write against the store
///
/// Every optimistic mutation resolves to exactly one of these; the
/// reload-on-failure step happens before `RolledBack` is produced, so
/// rollback is structural rather than per-call-site convention.
enum WriteOutcome {
    Committed,
    RolledBack(anyhow::Error),
}

/// Single-writer state holder for the exercise collection
///
/// Owns the in-memory cache and the only path to the store. The UI
/// renders `items`/`is_loading`/`is_saving` and calls the mutation
/// operations below.
pub struct ExerciseManager {
    store: Arc<dyn CollectionStore>,
    items: Collection,
    is_loading: bool,
    is_saving: bool,
}

impl ExerciseManager {
    /// Create a manager over the given store with an empty cache
    ///
    /// Call [`initialize`](Self::initialize) to populate `items`.
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            store,
            items: Collection::new(),
            is_loading: false,
            is_saving: false,
        }
    }

    /// The in-memory collection, newest exercise first
    pub fn items(&self) -> &Collection {
        &self.items
    }

    /// True while a load is in progress
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True while a mutation's persistence call is in flight
    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Load the persisted collection into the in-memory view
    ///
    /// Safe to call repeatedly; each call fully replaces `items` with
    /// the freshly loaded collection. Last call wins, no merge.
    pub async fn initialize(&mut self) {
        self.is_loading = true;
        self.items = self.store.load_all().await;
        self.is_loading = false;
        debug!("Loaded {} exercises", self.items.len());
    }

    /// Create a new exercise and persist the updated collection
    ///
    /// The exercise is prepended to `items` before the save; a failed
    /// save rolls the view back to the stored state and re-raises.
    ///
    /// # Errors
    ///
    /// * `GymwatchError::ConcurrentSave` if a save is already in flight
    /// * `GymwatchError::Validation` if the trimmed title is empty
    /// * `GymwatchError::Storage` if persistence fails (after rollback)
    pub async fn create_exercise(&mut self, title: &str) -> Result<Exercise> {
        self.guard_not_saving()?;

        let title = title.trim();
        if title.is_empty() {
            return Err(GymwatchError::Validation("title must not be empty".into()).into());
        }

        let exercise = Exercise::new(title);
        let mut next = self.items.clone();
        next.insert(0, exercise.clone());

        match self.write_optimistic(next).await {
            WriteOutcome::Committed => Ok(exercise),
            WriteOutcome::RolledBack(e) => Err(e),
        }
    }

    /// Delete an exercise and all its nested sessions and sets
    ///
    /// Optimistic: the exercise leaves `items` before the save; a
    /// failed save rolls the view back and re-raises.
    ///
    /// # Errors
    ///
    /// * `GymwatchError::ConcurrentSave` if a save is already in flight
    /// * `GymwatchError::Validation` if no exercise matches `id`
    /// * `GymwatchError::Storage` if persistence fails (after rollback)
    pub async fn delete_exercise(&mut self, id: &str) -> Result<()> {
        self.guard_not_saving()?;

        if !self.items.iter().any(|e| e.id == id) {
            return Err(GymwatchError::Validation(format!("unknown exercise '{}'", id)).into());
        }

        let next: Collection = self.items.iter().filter(|e| e.id != id).cloned().collect();

        match self.write_optimistic(next).await {
            WriteOutcome::Committed => Ok(()),
            WriteOutcome::RolledBack(e) => Err(e),
        }
    }

    /// Rename an exercise
    ///
    /// No-op when the trimmed title is empty or identical to the
    /// current title: no persistence call is made. Otherwise the
    /// authoritative collection is re-read from the store before the
    /// write, so a concurrent external change to another exercise is
    /// not clobbered by the stale cache.
    ///
    /// # Errors
    ///
    /// * `GymwatchError::ConcurrentSave` if a save is already in flight
    /// * `GymwatchError::Validation` if no exercise matches `id`
    /// * `GymwatchError::Storage` if persistence fails
    pub async fn update_exercise_title(&mut self, id: &str, new_title: &str) -> Result<()> {
        self.guard_not_saving()?;

        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Ok(());
        }
        if let Some(current) = self.items.iter().find(|e| e.id == id) {
            if current.title == new_title {
                return Ok(());
            }
        }

        let mut authoritative = self.store.load_all().await;
        let exercise = authoritative
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| GymwatchError::Validation(format!("unknown exercise '{}'", id)))?;
        exercise.title = new_title.to_string();

        self.write_through(authoritative).await
    }

    /// Commit a draft as a new session on an exercise
    ///
    /// Blank sets are stripped first; the filtered sets keep their
    /// original relative order. The in-memory view is updated only
    /// after a successful persist, so no rollback is needed here.
    ///
    /// # Errors
    ///
    /// * `GymwatchError::ConcurrentSave` if a save is already in flight
    /// * `GymwatchError::Validation` if no non-blank set remains or no
    ///   exercise matches `exercise_id`
    /// * `GymwatchError::Storage` if persistence fails
    pub async fn append_session(
        &mut self,
        exercise_id: &str,
        draft_sets: &[SetItem],
    ) -> Result<Session> {
        self.guard_not_saving()?;

        let sets: Vec<SetItem> = draft_sets.iter().filter(|s| !s.is_blank()).cloned().collect();
        if sets.is_empty() {
            return Err(GymwatchError::Validation("at least one set required".into()).into());
        }

        let session = Session::new(sets);

        let mut authoritative = self.store.load_all().await;
        let exercise = authoritative
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| {
                GymwatchError::Validation(format!("unknown exercise '{}'", exercise_id))
            })?;
        exercise.sessions.insert(0, session.clone());

        self.write_through(authoritative).await?;
        Ok(session)
    }

    /// Delete one session from an exercise
    ///
    /// Sibling sessions are untouched. A failed save reloads `items`
    /// from the store before the error is re-raised; the removal is
    /// not retried.
    ///
    /// # Errors
    ///
    /// * `GymwatchError::ConcurrentSave` if a save is already in flight
    /// * `GymwatchError::Validation` if the exercise or session is unknown
    /// * `GymwatchError::Storage` if persistence fails
    pub async fn delete_session(&mut self, exercise_id: &str, session_id: &str) -> Result<()> {
        self.guard_not_saving()?;

        let mut authoritative = self.store.load_all().await;
        let exercise = authoritative
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| {
                GymwatchError::Validation(format!("unknown exercise '{}'", exercise_id))
            })?;

        let before = exercise.sessions.len();
        exercise.sessions.retain(|s| s.id != session_id);
        if exercise.sessions.len() == before {
            return Err(GymwatchError::Validation(format!("unknown session '{}'", session_id)).into());
        }

        self.is_saving = true;
        let result = self.store.save_all(&authoritative).await;
        self.is_saving = false;

        match result {
            Ok(()) => {
                self.items = authoritative;
                Ok(())
            }
            Err(e) => {
                warn!("Session delete failed to persist, reloading: {}", e);
                self.items = self.store.load_all().await;
                Err(e)
            }
        }
    }

    /// Resolve an exercise by exact id or unique prefix
    ///
    /// Prefix matching mirrors how session ids are shortened in the
    /// CLI listing.
    ///
    /// # Errors
    ///
    /// Returns `GymwatchError::Validation` when nothing matches or the
    /// prefix is ambiguous.
    pub fn resolve_exercise(&self, id_or_prefix: &str) -> Result<&Exercise> {
        if let Some(exact) = self.items.iter().find(|e| e.id == id_or_prefix) {
            return Ok(exact);
        }

        let mut matches = self.items.iter().filter(|e| e.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(only),
            (Some(_), Some(_)) => Err(GymwatchError::Validation(format!(
                "ambiguous exercise id prefix '{}'",
                id_or_prefix
            ))
            .into()),
            (None, _) => {
                Err(GymwatchError::Validation(format!("unknown exercise '{}'", id_or_prefix))
                    .into())
            }
        }
    }

    /// Reject mutations while a save is in flight
    fn guard_not_saving(&self) -> Result<()> {
        if self.is_saving {
            return Err(GymwatchError::ConcurrentSave.into());
        }
        Ok(())
    }

    /// Optimistic write path: install `next` in the cache, persist it,
    /// and on failure reload the authoritative state before reporting
    /// the rollback
    async fn write_optimistic(&mut self, next: Collection) -> WriteOutcome {
        self.items = next;
        self.is_saving = true;
        let result = self.store.save_all(&self.items).await;
        self.is_saving = false;

        match result {
            Ok(()) => WriteOutcome::Committed,
            Err(e) => {
                warn!("Persist failed, rolling back to stored state: {}", e);
                self.items = self.store.load_all().await;
                WriteOutcome::RolledBack(e)
            }
        }
    }

    /// Read-modify-write path: persist an already-updated authoritative
    /// collection, then adopt it as the cache only on success
    async fn write_through(&mut self, authoritative: Collection) -> Result<()> {
        self.is_saving = true;
        let result = self.store.save_all(&authoritative).await;
        self.is_saving = false;

        result?;
        self.items = authoritative;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Store double: in-memory blob with a save kill switch
    struct FlakyStore {
        blob: Mutex<Collection>,
        fail_saves: AtomicBool,
        save_calls: AtomicUsize,
    }

    impl FlakyStore {
        fn new(initial: Collection) -> Self {
            Self {
                blob: Mutex::new(initial),
                fail_saves: AtomicBool::new(false),
                save_calls: AtomicUsize::new(0),
            }
        }

        fn fail_next_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }

        fn blob(&self) -> Collection {
            self.blob.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CollectionStore for FlakyStore {
        async fn load_all(&self) -> Collection {
            self.blob.lock().unwrap().clone()
        }

        async fn save_all(&self, items: &[Exercise]) -> Result<()> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(GymwatchError::Storage("disk full".into()).into());
            }
            *self.blob.lock().unwrap() = items.to_vec();
            Ok(())
        }
    }

    fn manager_with(initial: Collection) -> (ExerciseManager, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::new(initial));
        (ExerciseManager::new(store.clone()), store)
    }

    fn set(weight: Option<f64>, reps: Option<u32>) -> SetItem {
        SetItem {
            id: crate::model::new_record_id(),
            weight,
            reps,
            difficulty: Difficulty::Medium,
        }
    }

    fn is_validation(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<GymwatchError>(),
            Some(GymwatchError::Validation(_))
        )
    }

    #[tokio::test]
    async fn test_initialize_replaces_items_with_stored_state() {
        let (mut manager, _store) = manager_with(vec![Exercise::new("Squat")]);
        assert!(manager.items().is_empty());

        manager.initialize().await;
        assert_eq!(manager.items().len(), 1);
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn test_create_exercise_prepends_and_persists() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;

        let created = manager.create_exercise("Bench Press").await.expect("create failed");

        assert_eq!(manager.items().len(), 2);
        assert_eq!(manager.items()[0].id, created.id);
        assert_eq!(manager.items()[0].title, "Bench Press");
        assert_eq!(store.blob(), *manager.items());
    }

    #[tokio::test]
    async fn test_create_exercise_trims_title() {
        let (mut manager, _store) = manager_with(Collection::new());
        let created = manager.create_exercise("  Row  ").await.expect("create failed");
        assert_eq!(created.title, "Row");
    }

    #[tokio::test]
    async fn test_create_exercise_rejects_blank_title() {
        let (mut manager, store) = manager_with(Collection::new());

        let err = manager.create_exercise("   ").await.unwrap_err();
        assert!(is_validation(&err));
        assert!(manager.items().is_empty());
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_exercise_rejected_while_saving() {
        let (mut manager, store) = manager_with(Collection::new());
        manager.is_saving = true;

        let err = manager.create_exercise("Bench Press").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GymwatchError>(),
            Some(GymwatchError::ConcurrentSave)
        ));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_exercise_rolls_back_on_persist_failure() {
        let seeded = vec![Exercise::new("Squat")];
        let (mut manager, store) = manager_with(seeded.clone());
        manager.initialize().await;

        store.fail_next_saves(true);
        let err = manager.create_exercise("Bench Press").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GymwatchError>(),
            Some(GymwatchError::Storage(_))
        ));
        // In-memory view equals what load_all would return
        assert_eq!(*manager.items(), store.blob());
        assert_eq!(manager.items().len(), 1);
        assert_eq!(manager.items()[0].title, "Squat");
        assert!(!manager.is_saving());
    }

    #[tokio::test]
    async fn test_delete_exercise_isolates_siblings() {
        let mut a = Exercise::new("A");
        a.sessions.push(Session::new(vec![set(Some(60.0), Some(5))]));
        let mut b = Exercise::new("B");
        b.sessions.push(Session::new(vec![set(Some(80.0), Some(3))]));
        let b_clone = b.clone();

        let (mut manager, store) = manager_with(vec![a.clone(), b]);
        manager.initialize().await;

        manager.delete_exercise(&a.id).await.expect("delete failed");

        assert_eq!(manager.items().len(), 1);
        assert_eq!(manager.items()[0], b_clone);
        assert!(!store.blob().iter().any(|e| e.id == a.id));
    }

    #[tokio::test]
    async fn test_delete_exercise_unknown_id_is_validation_error() {
        let (mut manager, store) = manager_with(vec![Exercise::new("A")]);
        manager.initialize().await;

        let err = manager.delete_exercise("nope").await.unwrap_err();
        assert!(is_validation(&err));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_exercise_rolls_back_on_persist_failure() {
        let seeded = vec![Exercise::new("A"), Exercise::new("B")];
        let (mut manager, store) = manager_with(seeded);
        manager.initialize().await;
        let doomed = manager.items()[0].id.clone();

        store.fail_next_saves(true);
        manager.delete_exercise(&doomed).await.unwrap_err();

        assert_eq!(manager.items().len(), 2);
        assert_eq!(*manager.items(), store.blob());
    }

    #[tokio::test]
    async fn test_update_title_same_value_skips_persistence() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        manager
            .update_exercise_title(&id, "Squat")
            .await
            .expect("update failed");
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_title_empty_value_is_noop() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        manager
            .update_exercise_title(&id, "   ")
            .await
            .expect("update failed");
        assert_eq!(store.save_calls(), 0);
        assert_eq!(manager.items()[0].title, "Squat");
    }

    #[tokio::test]
    async fn test_update_title_reads_authoritative_state_before_writing() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        // External change the stale cache does not know about
        let mut external = store.blob();
        external.push(Exercise::new("Curl"));
        *store.blob.lock().unwrap() = external;

        manager
            .update_exercise_title(&id, "Back Squat")
            .await
            .expect("update failed");

        // Both the rename and the external addition survive
        assert_eq!(manager.items().len(), 2);
        assert_eq!(
            manager.items().iter().find(|e| e.id == id).unwrap().title,
            "Back Squat"
        );
        assert_eq!(store.blob(), *manager.items());
    }

    #[tokio::test]
    async fn test_append_session_filters_blank_sets_preserving_order() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let draft = vec![
            set(None, None),
            set(Some(50.0), Some(5)),
            set(None, None),
            set(None, Some(12)),
        ];
        let session = manager.append_session(&id, &draft).await.expect("append failed");

        assert_eq!(session.sets.len(), 2);
        assert_eq!(session.sets[0].weight, Some(50.0));
        assert_eq!(session.sets[0].reps, Some(5));
        assert_eq!(session.sets[1].reps, Some(12));

        let persisted = store.blob();
        assert_eq!(persisted[0].sessions.len(), 1);
        assert_eq!(persisted[0].sessions[0], session);
        assert_eq!(*manager.items(), persisted);
    }

    #[tokio::test]
    async fn test_append_session_rejects_empty_draft() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let err = manager.append_session(&id, &[]).await.unwrap_err();
        assert!(is_validation(&err));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_append_session_rejects_all_blank_draft() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let err = manager
            .append_session(&id, &[set(None, None), set(None, None)])
            .await
            .unwrap_err();
        assert!(is_validation(&err));
        assert_eq!(store.save_calls(), 0);
        assert!(store.blob()[0].sessions.is_empty());
    }

    #[tokio::test]
    async fn test_append_session_prepends_newest_first() {
        let (mut manager, _store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let first = manager
            .append_session(&id, &[set(Some(40.0), Some(8))])
            .await
            .expect("first append failed");
        let second = manager
            .append_session(&id, &[set(Some(45.0), Some(6))])
            .await
            .expect("second append failed");

        let sessions = &manager.items()[0].sessions;
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);
    }

    #[tokio::test]
    async fn test_append_session_failure_leaves_items_untouched() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        store.fail_next_saves(true);
        manager
            .append_session(&id, &[set(Some(50.0), Some(5))])
            .await
            .unwrap_err();

        assert!(manager.items()[0].sessions.is_empty());
        assert!(store.blob()[0].sessions.is_empty());
    }

    #[tokio::test]
    async fn test_delete_session_keeps_siblings() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let keep = manager
            .append_session(&id, &[set(Some(40.0), Some(8))])
            .await
            .expect("append failed");
        let doomed = manager
            .append_session(&id, &[set(Some(45.0), Some(6))])
            .await
            .expect("append failed");

        manager
            .delete_session(&id, &doomed.id)
            .await
            .expect("delete failed");

        let sessions = &manager.items()[0].sessions;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, keep.id);
        assert_eq!(store.blob(), *manager.items());
    }

    #[tokio::test]
    async fn test_delete_session_unknown_session_is_validation_error() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let err = manager.delete_session(&id, "missing").await.unwrap_err();
        assert!(is_validation(&err));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_session_reloads_items_on_persist_failure() {
        let (mut manager, store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();
        let session = manager
            .append_session(&id, &[set(Some(40.0), Some(8))])
            .await
            .expect("append failed");

        store.fail_next_saves(true);
        manager.delete_session(&id, &session.id).await.unwrap_err();

        // Session is still there: the view matches the stored state
        assert_eq!(manager.items()[0].sessions.len(), 1);
        assert_eq!(*manager.items(), store.blob());
    }

    #[tokio::test]
    async fn test_resolve_exercise_by_prefix() {
        let (mut manager, _store) = manager_with(vec![Exercise::new("Squat")]);
        manager.initialize().await;
        let id = manager.items()[0].id.clone();

        let found = manager.resolve_exercise(&id[..8]).expect("resolve failed");
        assert_eq!(found.id, id);

        assert!(is_validation(&manager.resolve_exercise("zzzzzz").unwrap_err()));
    }
}
