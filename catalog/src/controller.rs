use crate::cache::ListScope;
use crate::commands::*;
use crate::error::{Error, ErrorKind};
use crate::filter::filter_products;
use crate::model::{Product, ProductDraft, ProductId, Session};
use crate::queries::ListProducts;
use crate::Mediator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Surface showing transient messages to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind);
}

impl<F> Notifier for F
where
    F: Fn(&str, NotificationKind) + Send + Sync,
{
    fn notify(&self, message: &str, kind: NotificationKind) {
        (self)(message, kind)
    }
}

/// Surface asking the user a yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        (self)(prompt)
    }
}

/// State of the create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Closed,
    Create,
    Edit(Product),
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    /// The product being edited, if any.
    pub fn editing(&self) -> Option<&Product> {
        match self {
            Modal::Edit(product) => Some(product),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<FormMode> {
        match self {
            Modal::Closed => None,
            Modal::Create => Some(FormMode::Create),
            Modal::Edit(_) => Some(FormMode::Edit),
        }
    }
}

impl Default for Modal {
    fn default() -> Self {
        Modal::Closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Product),
    Cancelled,
}

#[derive(Debug, Default)]
struct ViewState {
    search_term: String,
    show_inactive: bool,
    modal: Modal,
}

/// Drives the products screen: owns its state, dispatches queries and
/// commands through the [Mediator] and reports outcomes to the user.
///
/// Errors are logged and notified here, then returned to the caller.
pub struct ProductsController {
    mediator: Mediator,
    session: Session,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    state: Mutex<ViewState>,
    pending: AtomicBool,
}

/// Clears the in-flight flag when the mutation completes.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ProductsController {
    pub fn new<N, C>(mediator: Mediator, session: Session, notifier: N, confirm: C) -> Self
    where
        N: Notifier + 'static,
        C: Confirm + 'static,
    {
        ProductsController {
            mediator,
            session,
            notifier: Arc::new(notifier),
            confirm: Arc::new(confirm),
            state: Mutex::new(ViewState::default()),
            pending: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn search_term(&self) -> String {
        self.state().search_term.clone()
    }

    pub fn set_search_term<S: Into<String>>(&self, term: S) {
        self.state().search_term = term.into();
    }

    pub fn show_inactive(&self) -> bool {
        self.state().show_inactive
    }

    pub fn set_show_inactive(&self, show_inactive: bool) {
        self.state().show_inactive = show_inactive;
    }

    pub fn toggle_show_inactive(&self) -> bool {
        let mut state = self.state();
        state.show_inactive = !state.show_inactive;
        state.show_inactive
    }

    pub fn scope(&self) -> ListScope {
        ListScope::from_show_inactive(self.show_inactive())
    }

    pub fn modal(&self) -> Modal {
        self.state().modal.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn open_for_create(&self) {
        self.state().modal = Modal::Create;
    }

    pub fn open_for_edit(&self, product: Product) {
        self.state().modal = Modal::Edit(product);
    }

    /// Closes the form, discarding the edit target.
    pub fn close_modal(&self) {
        self.state().modal = Modal::Closed;
    }

    /// Initial form values for the open modal.
    pub fn draft(&self) -> Option<ProductDraft> {
        match &self.state().modal {
            Modal::Closed => None,
            Modal::Create => Some(ProductDraft::new()),
            Modal::Edit(product) => Some(ProductDraft::from_product(product)),
        }
    }

    /// The products of the current scope narrowed by the search term.
    pub async fn products(&self) -> crate::Result<Vec<Product>> {
        let (scope, term) = {
            let state = self.state();
            let scope = ListScope::from_show_inactive(state.show_inactive);
            (scope, state.search_term.clone())
        };

        match self.mediator.send(ListProducts { scope }).await {
            Ok(products) => Ok(filter_products(&products, &term)),
            Err(err) => {
                self.report("Error loading products", &err);
                Err(err)
            }
        }
    }

    /// Creates or updates a product depending on the open modal.
    pub async fn submit(&self, draft: ProductDraft) -> crate::Result<Product> {
        let editing = match self.modal() {
            Modal::Closed => return Err(Error::precondition("no product form is open")),
            Modal::Create => None,
            Modal::Edit(product) => Some(product),
        };

        let (success, failure) = match editing {
            None => ("Product created successfully!", "Error creating product"),
            Some(_) => ("Product updated successfully!", "Error updating product"),
        };

        let _guard = self.begin_mutation(failure)?;

        let result = match editing {
            None => self.create(draft).await,
            Some(product) => self.update(product.id, draft).await,
        };

        match result {
            Ok(product) => {
                self.close_modal();
                self.notifier.notify(success, NotificationKind::Success);
                Ok(product)
            }
            Err(err) => {
                self.report(failure, &err);
                Err(err)
            }
        }
    }

    /// Deletes a product once the user confirms.
    pub async fn delete(&self, id: ProductId) -> crate::Result<DeleteOutcome> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            log::debug!("Delete of {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let _guard = self.begin_mutation("Error deleting product")?;

        match self.mediator.send(DeleteProductCommand(id)).await {
            Ok(product) => {
                self.notifier
                    .notify("Product deleted successfully!", NotificationKind::Success);
                Ok(DeleteOutcome::Deleted(product))
            }
            Err(err) => {
                self.report("Error deleting product", &err);
                Err(err)
            }
        }
    }

    /// Flips the active flag of `product`.
    pub async fn toggle_active(&self, product: &Product) -> crate::Result<Product> {
        let _guard = self.begin_mutation("Error changing product status")?;

        let command = ToggleProductActiveCommand {
            id: product.id,
            active: !product.active,
        };

        match self.mediator.send(command).await {
            Ok(product) => {
                let message = if product.active {
                    "Product activated"
                } else {
                    "Product deactivated"
                };
                self.notifier.notify(message, NotificationKind::Success);
                Ok(product)
            }
            Err(err) => {
                self.report("Error changing product status", &err);
                Err(err)
            }
        }
    }

    async fn create(&self, draft: ProductDraft) -> crate::Result<Product> {
        let command = CreateProductCommand {
            product: draft.into_new_product()?,
            company_id: self.session.company_id.clone(),
        };

        self.mediator.send(command).await
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> crate::Result<Product> {
        let command = UpdateProductCommand {
            id,
            changes: draft.into_changes()?,
        };

        self.mediator.send(command).await
    }

    fn begin_mutation(&self, fallback: &str) -> crate::Result<PendingGuard<'_>> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            let err = Error::from(ErrorKind::Busy);
            log::warn!("{}: {}", fallback, err);
            self.notify_error(fallback, &err);
            return Err(err);
        }

        Ok(PendingGuard(&self.pending))
    }

    fn report(&self, fallback: &str, err: &Error) {
        log::error!("{}: {}", fallback, err);
        self.notify_error(fallback, err);
    }

    // Precondition, validation and busy messages are shown as is, anything
    // else gets the generic message of the action.
    fn notify_error(&self, fallback: &str, err: &Error) {
        if err.is_user_facing() {
            self.notifier
                .notify(&err.to_string(), NotificationKind::Error);
        } else {
            self.notifier.notify(fallback, NotificationKind::Error);
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::app::catalog_mediator;
    use crate::app::test::{price, FlakyStore};
    use crate::cache::ProductsCache;
    use crate::model::{CompanyId, NewProduct, ProductChanges};
    use crate::store::{MemoryStore, ProductStore};
    use std::time::Duration;

    type Notes = Arc<Mutex<Vec<(String, NotificationKind)>>>;

    struct Harness {
        controller: ProductsController,
        notes: Notes,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl Harness {
        fn notes(&self) -> Vec<(String, NotificationKind)> {
            self.notes.lock().unwrap().clone()
        }

        fn last_note(&self) -> (String, NotificationKind) {
            self.notes().last().cloned().unwrap()
        }
    }

    fn harness<S>(store: S, session: Session, answer: bool) -> Harness
    where
        S: ProductStore + 'static,
    {
        let mediator = catalog_mediator(Arc::new(store), ProductsCache::new());
        let notes = Notes::default();
        let prompts = Arc::new(Mutex::new(Vec::new()));

        let log = notes.clone();
        let notifier = move |message: &str, kind: NotificationKind| {
            log.lock().unwrap().push((message.to_owned(), kind));
        };
        let asked = prompts.clone();
        let confirm = move |prompt: &str| {
            asked.lock().unwrap().push(prompt.to_owned());
            answer
        };

        Harness {
            controller: ProductsController::new(mediator, session, notifier, confirm),
            notes,
            prompts,
        }
    }

    fn draft(name: &str, amount: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_owned(),
            price: price(amount),
            ..ProductDraft::new()
        }
    }

    async fn seed(store: &MemoryStore, name: &str, sku: Option<&str>) -> Product {
        let mut product = NewProduct::new(name, price("10.00"));
        if let Some(sku) = sku {
            product = product.with_sku(sku);
        }
        store.create(product, &CompanyId::new("C1")).await.unwrap()
    }

    /// Delays every create so a mutation stays in flight.
    #[derive(Clone, Default)]
    struct SlowStore(MemoryStore);

    #[async_trait::async_trait]
    impl ProductStore for SlowStore {
        async fn list_active(&self) -> crate::Result<Vec<Product>> {
            self.0.list_active().await
        }

        async fn list_all(&self) -> crate::Result<Vec<Product>> {
            self.0.list_all().await
        }

        async fn get_by_id(&self, id: ProductId) -> crate::Result<Option<Product>> {
            self.0.get_by_id(id).await
        }

        async fn create(&self, product: NewProduct, company_id: &CompanyId) -> crate::Result<Product> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.0.create(product, company_id).await
        }

        async fn update(&self, id: ProductId, changes: ProductChanges) -> crate::Result<Product> {
            self.0.update(id, changes).await
        }

        async fn delete(&self, id: ProductId) -> crate::Result<Product> {
            self.0.delete(id).await
        }
    }

    #[test]
    fn modal_transitions_test() {
        let h = harness(MemoryStore::new(), Session::for_company("C1"), true);
        let c = &h.controller;

        assert_eq!(c.modal(), Modal::Closed);
        assert_eq!(c.draft(), None);

        c.open_for_create();
        assert_eq!(c.modal().mode(), Some(FormMode::Create));
        assert_eq!(c.draft(), Some(ProductDraft::new()));

        c.close_modal();
        assert!(!c.modal().is_open());
    }

    #[tokio::test]
    async fn products_filter_and_scope_test() {
        let store = MemoryStore::new();
        seed(&store, "Consultoria", Some("CONS-001")).await;
        seed(&store, "Auditoria", None).await;
        let hidden = seed(&store, "Treinamento", Some("TRN-CONS")).await;
        store
            .update(hidden.id, ProductChanges::active(false))
            .await
            .unwrap();

        let h = harness(store.clone(), Session::for_company("C1"), true);
        let c = &h.controller;
        let names = |list: Vec<Product>| list.into_iter().map(|p| p.name).collect::<Vec<_>>();

        assert_eq!(names(c.products().await.unwrap()), vec!["Auditoria", "Consultoria"]);

        c.set_search_term("cons");
        assert_eq!(names(c.products().await.unwrap()), vec!["Consultoria"]);

        assert!(c.toggle_show_inactive());
        assert_eq!(c.scope(), ListScope::All);
        assert_eq!(
            names(c.products().await.unwrap()),
            vec!["Consultoria", "Treinamento"]
        );

        // Changing the term only filters what is already cached.
        let calls = store.calls();
        c.set_search_term("");
        assert_eq!(c.products().await.unwrap().len(), 3);
        assert_eq!(store.calls(), calls);
    }

    #[tokio::test]
    async fn submit_create_test() {
        let h = harness(MemoryStore::new(), Session::for_company("C1"), true);
        let c = &h.controller;

        c.open_for_create();
        let created = c.submit(draft("Consultoria", "150.00")).await.unwrap();

        assert_eq!(created.company_id, CompanyId::new("C1"));
        assert_eq!(c.modal(), Modal::Closed);
        assert_eq!(
            h.last_note(),
            ("Product created successfully!".to_owned(), NotificationKind::Success)
        );
        assert_eq!(c.products().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn submit_without_company_test() {
        let store = MemoryStore::new();
        let h = harness(store.clone(), Session::anonymous(), true);
        let c = &h.controller;

        c.open_for_create();
        let err = c.submit(draft("Consultoria", "150.00")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(c.modal(), Modal::Create);
        assert_eq!(store.calls(), 0);
        assert_eq!(
            h.notes(),
            vec![(
                "user has no associated company".to_owned(),
                NotificationKind::Error
            )]
        );
    }

    #[tokio::test]
    async fn submit_invalid_draft_test() {
        let store = MemoryStore::new();
        let h = harness(store.clone(), Session::for_company("C1"), true);
        let c = &h.controller;

        c.open_for_create();
        let err = c.submit(draft("   ", "150.00")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(c.modal().is_open());
        assert_eq!(store.calls(), 0);
        assert_eq!(h.last_note().1, NotificationKind::Error);
    }

    #[tokio::test]
    async fn submit_edit_test() {
        let store = MemoryStore::new();
        let product = seed(&store, "Consultoria", None).await;
        let h = harness(store, Session::for_company("C1"), true);
        let c = &h.controller;

        c.open_for_edit(product.clone());
        let mut form = c.draft().unwrap();
        assert_eq!(form.name, "Consultoria");
        form.price = price("199.90");

        let updated = c.submit(form).await.unwrap();

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.price, price("199.90"));
        assert_eq!(c.modal(), Modal::Closed);
        assert_eq!(c.modal().editing(), None);
        assert_eq!(
            h.last_note(),
            ("Product updated successfully!".to_owned(), NotificationKind::Success)
        );
    }

    #[tokio::test]
    async fn submit_store_failure_test() {
        let store = FlakyStore::default();
        let product = store
            .inner
            .create(NewProduct::new("Consultoria", price("150.00")), &CompanyId::new("C1"))
            .await
            .unwrap();
        store.failing.store(true, Ordering::SeqCst);

        let h = harness(store, Session::for_company("C1"), true);
        let c = &h.controller;

        c.open_for_edit(product.clone());
        let err = c.submit(c.draft().unwrap()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(c.modal(), Modal::Edit(product));
        assert_eq!(
            h.last_note(),
            ("Error updating product".to_owned(), NotificationKind::Error)
        );
        assert!(!c.is_pending());
    }

    #[tokio::test]
    async fn submit_closed_modal_test() {
        let store = MemoryStore::new();
        let h = harness(store.clone(), Session::for_company("C1"), true);

        let err = h
            .controller
            .submit(draft("Consultoria", "150.00"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn double_submission_test() {
        let store = SlowStore::default();
        let h = harness(store.clone(), Session::for_company("C1"), true);
        let c = &h.controller;

        c.open_for_create();
        let (first, second) = tokio::join!(
            c.submit(draft("Consultoria", "150.00")),
            c.submit(draft("Consultoria", "150.00")),
        );

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err().kind(), ErrorKind::Busy);
        assert_eq!(store.0.len().await, 1);
        assert!(!c.is_pending());

        let notes = h.notes();
        assert!(notes.contains(&(
            "another operation is in progress".to_owned(),
            NotificationKind::Error
        )));
        assert!(notes.contains(&(
            "Product created successfully!".to_owned(),
            NotificationKind::Success
        )));
    }

    #[tokio::test]
    async fn delete_cancelled_test() {
        let store = MemoryStore::new();
        let product = seed(&store, "Consultoria", None).await;
        let calls = store.calls();
        let h = harness(store.clone(), Session::for_company("C1"), false);

        let outcome = h.controller.delete(product.id).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(store.calls(), calls);
        assert!(h.notes().is_empty());
        assert_eq!(*h.prompts.lock().unwrap(), vec![DELETE_PROMPT.to_owned()]);
    }

    #[tokio::test]
    async fn delete_test() {
        let store = MemoryStore::new();
        let product = seed(&store, "Consultoria", None).await;
        let h = harness(store.clone(), Session::for_company("C1"), true);
        let c = &h.controller;

        assert_eq!(c.products().await.unwrap().len(), 1);
        let outcome = c.delete(product.id).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted(product.clone()));
        assert!(c.products().await.unwrap().is_empty());
        assert_eq!(
            h.last_note(),
            ("Product deleted successfully!".to_owned(), NotificationKind::Success)
        );

        let err = c.delete(product.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            h.last_note(),
            ("Error deleting product".to_owned(), NotificationKind::Error)
        );
    }

    #[tokio::test]
    async fn toggle_active_test() {
        let store = MemoryStore::new();
        let product = seed(&store, "Consultoria", None).await;
        let h = harness(store, Session::for_company("C1"), true);
        let c = &h.controller;

        let deactivated = c.toggle_active(&product).await.unwrap();
        assert!(!deactivated.active);
        assert_eq!(h.last_note().0, "Product deactivated");
        assert!(c.products().await.unwrap().is_empty());

        let activated = c.toggle_active(&deactivated).await.unwrap();
        assert!(activated.active);
        assert_eq!(h.last_note().0, "Product activated");
        assert_eq!(c.products().await.unwrap(), vec![activated]);
    }

    #[tokio::test]
    async fn toggle_failure_test() {
        let store = FlakyStore::default();
        let product = store
            .inner
            .create(NewProduct::new("Consultoria", price("150.00")), &CompanyId::new("C1"))
            .await
            .unwrap();
        store.failing.store(true, Ordering::SeqCst);
        let h = harness(store, Session::for_company("C1"), true);

        let err = h.controller.toggle_active(&product).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(
            h.last_note(),
            ("Error changing product status".to_owned(), NotificationKind::Error)
        );
    }
}
