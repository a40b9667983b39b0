//! Page controllers
//!
//! Each page keeps its own state and a [`Mount`]. Loads are guarded by the
//! mount so a response that arrives after the page is gone is dropped.
//! Recoverable API failures become a message on the page; only hard
//! failures are returned to the caller.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::{
    api::books::BooksClient,
    error::{AppError, AppResult},
    forms::{Form, FormError, FormRecord},
    models::{
        book::{Book, BookDraft},
        user::{LoginRequest, SignupRequest},
    },
    services::{auth::AuthService, session::SessionStore, Services},
};

use super::{
    mount::{Mount, MountToken},
    render,
    router::{AuthState, Route},
};

type Shared<T> = Arc<Mutex<T>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the shell does after a page action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

/// Store a fetch result in page state, unless the page was unmounted
fn settle<T>(
    token: &MountToken,
    slot: &Mutex<Loadable<T>>,
    result: Option<AppResult<T>>,
    what: &str,
) -> AppResult<()> {
    let result = match result {
        Some(result) if token.is_mounted() => result,
        _ => {
            tracing::debug!("Dropping {} response for an unmounted view", what);
            return Ok(());
        }
    };

    match result {
        Ok(value) => *lock(slot) = Loadable::Loaded(value),
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", what, e);
            *lock(slot) = Loadable::Failed(format!("Failed to load {}", what));
            if !e.is_recoverable() {
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Turn a failed submission into a page message; hard failures propagate
fn report(message: &Mutex<Option<String>>, prefix: &str, e: AppError) -> AppResult<Outcome> {
    tracing::warn!("{}: {}", prefix, e);
    *lock(message) = Some(format!("{}: {}", prefix, e));
    if e.is_recoverable() {
        Ok(Outcome::Stay)
    } else {
        Err(e)
    }
}

/// Listing of every book in the catalog
pub struct HomePage {
    books: BooksClient,
    state: Shared<Loadable<Vec<Book>>>,
    mount: Mount,
}

impl HomePage {
    pub fn new(books: BooksClient) -> Self {
        Self {
            books,
            state: Arc::new(Mutex::new(Loadable::Loading)),
            mount: Mount::new(),
        }
    }

    pub fn load(&self) -> impl Future<Output = AppResult<()>> + Send + 'static {
        let books = self.books.clone();
        let state = self.state.clone();
        let token = self.mount.token();
        async move {
            let result = token.guard(books.list()).await;
            settle(&token, &state, result, "books")
        }
    }

    pub fn state(&self) -> Loadable<Vec<Book>> {
        lock(&self.state).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn render(&self) -> String {
        match &*lock(&self.state) {
            Loadable::Loading => "Loading books...\n".to_string(),
            Loadable::Loaded(books) => render::book_list(books),
            Loadable::Failed(message) => format!("{}\n", message),
        }
    }
}

/// Details of one book, with edit and delete for signed-in users
pub struct BookPage {
    id: String,
    books: BooksClient,
    session: SessionStore,
    state: Shared<Loadable<Book>>,
    message: Shared<Option<String>>,
    mount: Mount,
}

impl BookPage {
    pub fn new(id: impl Into<String>, books: BooksClient, session: SessionStore) -> Self {
        Self {
            id: id.into(),
            books,
            session,
            state: Arc::new(Mutex::new(Loadable::Loading)),
            message: Arc::new(Mutex::new(None)),
            mount: Mount::new(),
        }
    }

    pub fn load(&self) -> impl Future<Output = AppResult<()>> + Send + 'static {
        let books = self.books.clone();
        let state = self.state.clone();
        let token = self.mount.token();
        let id = self.id.clone();
        async move {
            let result = token.guard(books.get(&id)).await;
            settle(&token, &state, result, "book details")
        }
    }

    pub fn state(&self) -> Loadable<Book> {
        lock(&self.state).clone()
    }

    pub fn message(&self) -> Option<String> {
        lock(&self.message).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Delete the book and go home; on failure stay here with a message
    pub async fn delete(&self) -> AppResult<Outcome> {
        if !self.session.is_authenticated() {
            *lock(&self.message) = Some("Log in to delete books".to_string());
            return Ok(Outcome::Stay);
        }

        match self.books.remove(&self.id).await {
            Ok(()) => Ok(Outcome::Navigate(Route::Home)),
            Err(e) => report(&self.message, "Failed to delete book", e),
        }
    }

    pub fn edit(&self) -> Outcome {
        if self.session.is_authenticated() {
            Outcome::Navigate(Route::EditBook(self.id.clone()))
        } else {
            *lock(&self.message) = Some("Log in to edit books".to_string());
            Outcome::Stay
        }
    }

    pub fn render(&self, auth: AuthState, today: NaiveDate) -> String {
        let mut out = match &*lock(&self.state) {
            Loadable::Loading => "Loading book...\n".to_string(),
            Loadable::Loaded(book) => render::book_preview(book, auth, today),
            Loadable::Failed(message) => format!("{}\n[back]\n", message),
        };
        if let Some(message) = &*lock(&self.message) {
            out.push_str(&format!("! {}\n", message));
        }
        out
    }
}

/// Form state plus the message shown under it
pub struct FormView<R: FormRecord> {
    form: Shared<Form<R>>,
    message: Shared<Option<String>>,
}

impl<R: FormRecord> FormView<R> {
    fn new(form: Form<R>) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            message: Arc::new(Mutex::new(None)),
        }
    }

    pub fn form(&self) -> Form<R> {
        lock(&self.form).clone()
    }

    pub fn message(&self) -> Option<String> {
        lock(&self.message).clone()
    }

    pub fn set(&self, name: &str, value: &str) -> Result<(), FormError> {
        lock(&self.form).set(name, value)
    }

    /// Draft to submit, or `None` with the reason shown on the page
    fn begin(&self) -> Option<R> {
        match lock(&self.form).begin_submit() {
            Ok(draft) => {
                *lock(&self.message) = None;
                Some(draft)
            }
            Err(e) => {
                tracing::debug!("Submission blocked: {}", e);
                *lock(&self.message) = Some(e.to_string());
                None
            }
        }
    }

    fn finish(&self) {
        lock(&self.form).finish_submit();
    }

    fn fail(&self, prefix: &str, e: AppError) -> AppResult<Outcome> {
        self.finish();
        report(&self.message, prefix, e)
    }

    fn render(&self, title: &str, submit_label: &str) -> String {
        let mut out = render::form(title, submit_label, &lock(&self.form));
        if let Some(message) = &*lock(&self.message) {
            out.push_str(&format!("! {}\n", message));
        }
        out
    }
}

pub struct AddBookPage {
    books: BooksClient,
    view: FormView<BookDraft>,
}

impl AddBookPage {
    pub fn new(books: BooksClient) -> Self {
        Self {
            books,
            view: FormView::new(Form::new()),
        }
    }

    pub fn view(&self) -> &FormView<BookDraft> {
        &self.view
    }

    pub async fn submit(&self) -> AppResult<Outcome> {
        let Some(draft) = self.view.begin() else {
            return Ok(Outcome::Stay);
        };

        match self.books.create(&draft).await {
            Ok(book) => {
                self.view.finish();
                Ok(Outcome::Navigate(Route::Book(book.id)))
            }
            Err(e) => self.view.fail("Failed to add book", e),
        }
    }

    pub fn render(&self) -> String {
        self.view.render("Add a New Book", "Add Book")
    }
}

/// Edit form; stays in `Loading` until the book is fetched
pub struct EditBookPage {
    id: String,
    books: BooksClient,
    view: FormView<BookDraft>,
    mount: Mount,
}

impl EditBookPage {
    pub fn new(id: impl Into<String>, books: BooksClient) -> Self {
        Self {
            id: id.into(),
            books,
            view: FormView::new(Form::loading()),
            mount: Mount::new(),
        }
    }

    pub fn view(&self) -> &FormView<BookDraft> {
        &self.view
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn load(&self) -> impl Future<Output = AppResult<()>> + Send + 'static {
        let books = self.books.clone();
        let form = self.view.form.clone();
        let message = self.view.message.clone();
        let token = self.mount.token();
        let id = self.id.clone();
        async move {
            let result = match token.guard(books.get(&id)).await {
                Some(result) if token.is_mounted() => result,
                _ => {
                    tracing::debug!("Dropping book {} response for an unmounted view", id);
                    return Ok(());
                }
            };

            match result {
                Ok(book) => {
                    lock(&form).populate(book.to_draft());
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Failed to load book {}: {}", id, e);
                    *lock(&message) = Some("Failed to load book".to_string());
                    if e.is_recoverable() {
                        Ok(())
                    } else {
                        Err(e)
                    }
                }
            }
        }
    }

    pub async fn submit(&self) -> AppResult<Outcome> {
        let Some(draft) = self.view.begin() else {
            return Ok(Outcome::Stay);
        };

        match self.books.update(&self.id, &draft).await {
            Ok(book) => {
                self.view.finish();
                Ok(Outcome::Navigate(Route::Book(book.id)))
            }
            Err(e) => self.view.fail("Failed to update book", e),
        }
    }

    pub fn render(&self) -> String {
        self.view.render("Update Book", "Update Book")
    }
}

pub struct LoginPage {
    auth: AuthService,
    view: FormView<LoginRequest>,
}

impl LoginPage {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            view: FormView::new(Form::new()),
        }
    }

    pub fn view(&self) -> &FormView<LoginRequest> {
        &self.view
    }

    pub async fn submit(&self) -> AppResult<Outcome> {
        let Some(request) = self.view.begin() else {
            return Ok(Outcome::Stay);
        };

        match self.auth.login(&request).await {
            Ok(_) => {
                self.view.finish();
                Ok(Outcome::Navigate(Route::Home))
            }
            Err(e) => self.view.fail("Failed to login", e),
        }
    }

    pub fn render(&self) -> String {
        self.view.render("Login", "Login")
    }
}

pub struct SignupPage {
    auth: AuthService,
    view: FormView<SignupRequest>,
}

impl SignupPage {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            view: FormView::new(Form::new()),
        }
    }

    pub fn view(&self) -> &FormView<SignupRequest> {
        &self.view
    }

    pub async fn submit(&self) -> AppResult<Outcome> {
        let Some(request) = self.view.begin() else {
            return Ok(Outcome::Stay);
        };

        match self.auth.signup(&request).await {
            Ok(_) => {
                self.view.finish();
                Ok(Outcome::Navigate(Route::Home))
            }
            Err(e) => self.view.fail("Failed to register new user", e),
        }
    }

    pub fn render(&self) -> String {
        self.view.render("Signup", "Signup")
    }
}

/// The page currently on screen
pub enum Page {
    Home(HomePage),
    Book(BookPage),
    AddBook(AddBookPage),
    EditBook(EditBookPage),
    Login(LoginPage),
    Signup(SignupPage),
    NotFound(String),
}

impl Page {
    pub fn for_route(route: &Route, services: &Services) -> Page {
        match route {
            Route::Home => Page::Home(HomePage::new(services.books.clone())),
            Route::Book(id) => Page::Book(BookPage::new(
                id.clone(),
                services.books.clone(),
                services.session.clone(),
            )),
            Route::AddBook => Page::AddBook(AddBookPage::new(services.books.clone())),
            Route::EditBook(id) => {
                Page::EditBook(EditBookPage::new(id.clone(), services.books.clone()))
            }
            Route::Login => Page::Login(LoginPage::new(services.auth.clone())),
            Route::Signup => Page::Signup(SignupPage::new(services.auth.clone())),
            Route::NotFound(path) => Page::NotFound(path.clone()),
        }
    }

    pub async fn load(&self) -> AppResult<()> {
        match self {
            Page::Home(page) => page.load().await,
            Page::Book(page) => page.load().await,
            Page::EditBook(page) => page.load().await,
            _ => Ok(()),
        }
    }

    pub fn has_form(&self) -> bool {
        matches!(
            self,
            Page::AddBook(_) | Page::EditBook(_) | Page::Login(_) | Page::Signup(_)
        )
    }

    pub fn set_field(&self, name: &str, value: &str) -> Result<(), FormError> {
        match self {
            Page::AddBook(page) => page.view.set(name, value),
            Page::EditBook(page) => page.view.set(name, value),
            Page::Login(page) => page.view.set(name, value),
            Page::Signup(page) => page.view.set(name, value),
            _ => Err(FormError::UnknownField(name.to_string())),
        }
    }

    pub async fn submit(&self) -> AppResult<Outcome> {
        match self {
            Page::AddBook(page) => page.submit().await,
            Page::EditBook(page) => page.submit().await,
            Page::Login(page) => page.submit().await,
            Page::Signup(page) => page.submit().await,
            _ => Ok(Outcome::Stay),
        }
    }

    pub async fn delete(&self) -> AppResult<Outcome> {
        match self {
            Page::Book(page) => page.delete().await,
            _ => Ok(Outcome::Stay),
        }
    }

    pub fn edit(&self) -> Outcome {
        match self {
            Page::Book(page) => page.edit(),
            _ => Outcome::Stay,
        }
    }

    pub fn render(&self, auth: AuthState) -> String {
        match self {
            Page::Home(page) => page.render(),
            Page::Book(page) => page.render(auth, render::today()),
            Page::AddBook(page) => page.render(),
            Page::EditBook(page) => page.render(),
            Page::Login(page) => page.render(),
            Page::Signup(page) => page.render(),
            Page::NotFound(path) => render::not_found(path),
        }
    }
}
