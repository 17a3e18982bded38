use preloader::mock::{MockFetcher, MockResolver};
use preloader::{
    fetcher_fn, preload, resolver_fn, BoxError, HasOneLoadable, Loadable, LoaderConfig,
    PreloadError, Preloadable, Relations, Resource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct Book {
    id: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct Chapter {
    id: u32,
}

impl Resource for User {
    type Id = u32;

    fn resource_id(&self) -> u32 {
        self.id
    }
}

impl Resource for Book {
    type Id = u32;

    fn resource_id(&self) -> u32 {
        self.id
    }
}

impl Resource for Chapter {
    type Id = u32;

    fn resource_id(&self) -> u32 {
        self.id
    }
}

fn users(ids: &[u32]) -> Vec<User> {
    ids.iter().map(|&id| User { id }).collect()
}

fn book_fetcher(ids: &[u32]) -> MockFetcher<Book> {
    let fetcher = MockFetcher::<Book>::new();
    fetcher.with_nodes(ids.iter().map(|&id| Book { id }));
    fetcher
}

fn sorted_ids<R: Resource<Id = u32>>(nodes: Vec<R>) -> Vec<u32> {
    let mut ids: Vec<u32> = nodes.iter().map(Resource::resource_id).collect();
    ids.sort_unstable();
    ids
}

/// Users -> Books -> Chapters. Book 13 exists but no user points at it, so its chapter must
/// never reach the chapter loader.
#[tokio::test]
async fn test_three_level_cascade_batches_each_level_once() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10, 11]).relate(2, vec![12]);

    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    chapter_resolver
        .relate(10, vec![100])
        .relate(11, vec![101, 102])
        .relate(12, vec![])
        .relate(13, vec![103]);
    let chapter_fetcher = MockFetcher::<Chapter>::new();
    chapter_fetcher.with_nodes([100, 101, 102, 103].map(|id| Chapter { id }));

    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        chapter_fetcher.clone(),
    ));
    let book_fetcher = book_fetcher(&[10, 11, 12, 13]);
    let books = Arc::new(
        Loadable::new("books", book_resolver.clone(), book_fetcher.clone())
            .with_child(chapters.clone()),
    );

    let ctx = CancellationToken::new();
    preload(&ctx, &users(&[1, 2]), &[&*books])
        .await
        .expect("preload failed");

    // One resolver call and one fetcher call per level
    assert_eq!(book_resolver.call_count(), 1);
    assert_eq!(book_fetcher.calls(), vec![vec![10, 11, 12]]);
    assert_eq!(chapter_resolver.calls(), vec![vec![10, 11, 12]]);
    assert_eq!(chapter_fetcher.calls(), vec![vec![100, 101, 102]]);

    // Only reachable nodes are cached at the leaf
    assert_eq!(sorted_ids(chapters.loaded()), vec![100, 101, 102]);
    assert_eq!(chapters.cached(&12), Some(vec![]));
    assert_eq!(chapters.cached(&13), None);

    // Lazy lookups after the preload are served from cache
    let books_of_one = books.load(&ctx, &User { id: 1 }).await.unwrap();
    assert_eq!(books_of_one, vec![Book { id: 10 }, Book { id: 11 }]);
    let chapters_of_eleven = chapters.load(&ctx, &Book { id: 11 }).await.unwrap();
    assert_eq!(chapters_of_eleven.len(), 2);
    assert_eq!(book_resolver.call_count(), 1);
    assert_eq!(chapter_resolver.call_count(), 1);
}

/// User 1 owns books 10 and 11, each with a single author.
#[tokio::test]
async fn test_books_with_author_child() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10, 11]);

    let author_resolver = MockResolver::<Book, User>::new();
    author_resolver.relate(10, vec![7]).relate(11, vec![8]);
    let author_fetcher = MockFetcher::<User>::new();
    author_fetcher.with_nodes(users(&[7, 8]));

    let authors = Arc::new(HasOneLoadable::new(
        "authors",
        author_resolver.clone(),
        author_fetcher.clone(),
    ));
    let books = Arc::new(
        Loadable::new("books", book_resolver, book_fetcher(&[10, 11]))
            .with_child(authors.clone()),
    );

    let ctx = CancellationToken::new();
    preload(&ctx, &users(&[1]), &[&*books]).await.unwrap();

    assert_eq!(books.cached(&1).map(|b| b.len()), Some(2));
    assert_eq!(authors.cached_parents(), 2);
    assert_eq!(authors.cached(&10), Some(User { id: 7 }));
    assert_eq!(authors.cached(&11), Some(User { id: 8 }));
    assert_eq!(author_resolver.calls(), vec![vec![10, 11]]);
    assert_eq!(author_fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_orchestrator_drives_heterogeneous_roots() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10]).relate(2, vec![11]);
    let books = Loadable::new("books", book_resolver.clone(), book_fetcher(&[10, 11]));

    let favourite_resolver = MockResolver::<User, Book>::new();
    favourite_resolver.relate(1, vec![11]);
    let favourites = HasOneLoadable::new(
        "favourite",
        favourite_resolver.clone(),
        book_fetcher(&[10, 11]),
    )
    .with_accept_not_found(true);

    let ctx = CancellationToken::new();
    preload(&ctx, &users(&[1, 2]), &[&books, &favourites])
        .await
        .unwrap();

    assert_eq!(book_resolver.call_count(), 1);
    assert_eq!(favourite_resolver.call_count(), 1);
    assert_eq!(books.cached_parents(), 2);
    assert_eq!(favourites.cached(&1), Some(Book { id: 11 }));
    assert_eq!(favourites.cached(&2), None);
}

#[tokio::test]
async fn test_orchestrator_is_noop_for_empty_inputs() {
    let resolver = MockResolver::<User, Book>::new();
    let fetcher = MockFetcher::<Book>::new();
    let books = Loadable::new("books", resolver.clone(), fetcher.clone());
    let ctx = CancellationToken::new();

    let nobody: Vec<User> = Vec::new();
    preload(&ctx, &nobody, &[&books]).await.unwrap();
    preload(&ctx, &users(&[1]), &[]).await.unwrap();

    assert_eq!(resolver.call_count(), 0);
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(books.cached_parents(), 0);
}

#[tokio::test]
async fn test_orchestrator_stops_at_first_failing_root() {
    let failing = MockResolver::<User, Book>::new();
    failing.fail_next("connection reset");
    let first = Loadable::new("first", failing, MockFetcher::<Book>::new());

    let untouched = MockResolver::<User, Book>::new();
    let second = Loadable::new("second", untouched.clone(), MockFetcher::<Book>::new());

    let result = preload(&CancellationToken::new(), &users(&[1]), &[&first, &second]).await;

    match result {
        Err(PreloadError::Collaborator { relation, source }) => {
            assert_eq!(relation, "first");
            assert_eq!(source.to_string(), "mock failure: connection reset");
        }
        other => panic!("expected a collaborator error, got {other:?}"),
    }
    assert_eq!(untouched.call_count(), 0);
}

#[tokio::test]
async fn test_child_cardinality_error_aborts_cascade_after_parent_commit() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10]);

    // Book 10 resolves two authors
    let author_resolver = MockResolver::<Book, User>::new();
    author_resolver.relate(10, vec![7, 8]);
    let author_fetcher = MockFetcher::<User>::new();
    author_fetcher.with_nodes(users(&[7, 8]));
    let authors = Arc::new(HasOneLoadable::new("authors", author_resolver, author_fetcher));

    let books = Loadable::new("books", book_resolver, book_fetcher(&[10])).with_child(authors.clone());

    let err = preload(&CancellationToken::new(), &users(&[1]), &[&books])
        .await
        .unwrap_err();

    assert!(err.is_cardinality());
    assert!(matches!(err, PreloadError::TooManyHasOne { found: 2, .. }));
    // The parent level was committed before the child ran
    assert_eq!(books.cached(&1), Some(vec![Book { id: 10 }]));
    assert_eq!(authors.cached_parents(), 0);
}

#[tokio::test]
async fn test_concurrent_children_are_all_preloaded() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10, 11]);

    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    chapter_resolver.relate(10, vec![100]).relate(11, vec![101]);
    let chapter_fetcher = MockFetcher::<Chapter>::new();
    chapter_fetcher.with_nodes([100, 101].map(|id| Chapter { id }));
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        chapter_fetcher,
    ));

    let editor_resolver = MockResolver::<Book, User>::new();
    editor_resolver.relate(10, vec![7]);
    let editor_fetcher = MockFetcher::<User>::new();
    editor_fetcher.with_nodes(users(&[7]));
    let editors = Arc::new(
        HasOneLoadable::new("editors", editor_resolver.clone(), editor_fetcher)
            .with_accept_not_found(true),
    );

    let books = Loadable::new("books", book_resolver, book_fetcher(&[10, 11]))
        .with_config(LoaderConfig::default().with_concurrent_children(true))
        .with_child(chapters.clone())
        .with_child(editors.clone());

    preload(&CancellationToken::new(), &users(&[1]), &[&books])
        .await
        .unwrap();

    assert_eq!(chapter_resolver.call_count(), 1);
    assert_eq!(editor_resolver.call_count(), 1);
    assert_eq!(sorted_ids(chapters.loaded()), vec![100, 101]);
    assert_eq!(editors.cached(&10), Some(User { id: 7 }));
    assert_eq!(editors.cached(&11), None);
}

#[tokio::test]
async fn test_closure_collaborators() {
    let resolves = Arc::new(AtomicUsize::new(0));
    let fetches = Arc::new(AtomicUsize::new(0));

    let resolve_counter = resolves.clone();
    let fetch_counter = fetches.clone();
    let books = Loadable::<User, Book>::new(
        "books",
        resolver_fn(move |_ctx: CancellationToken, users: Vec<User>| {
            resolve_counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let relations: Relations<User, Book> =
                    users.iter().map(|u| (u.id, vec![u.id * 10])).collect();
                Ok::<_, BoxError>(relations)
            }
        }),
        fetcher_fn(move |_ctx: CancellationToken, ids: Vec<u32>| {
            fetch_counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, BoxError>(ids.into_iter().map(|id| Book { id }).collect()) }
        }),
    );

    let ctx = CancellationToken::new();
    books.preload(&ctx, &users(&[1, 2, 3])).await.unwrap();

    assert_eq!(resolves.load(Ordering::SeqCst), 1);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(books.cached(&3), Some(vec![Book { id: 30 }]));
}

#[tokio::test]
async fn test_cancelled_token_stops_before_root_resolver() {
    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        MockFetcher::<Chapter>::new(),
    ));

    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10]);
    let books = Loadable::new("books", book_resolver.clone(), book_fetcher(&[10]))
        .with_child(chapters.clone());

    let ctx = CancellationToken::new();
    ctx.cancel();
    let err = preload(&ctx, &users(&[1]), &[&books]).await.unwrap_err();

    assert!(matches!(err, PreloadError::Cancelled { ref relation } if relation == "books"));
    assert_eq!(book_resolver.call_count(), 0);
    assert_eq!(chapter_resolver.call_count(), 0);
}

#[tokio::test]
async fn test_cancel_during_resolve_skips_fetch() {
    let fetcher = book_fetcher(&[10]);
    let books = Loadable::<User, Book>::new(
        "books",
        resolver_fn(|ctx: CancellationToken, users: Vec<User>| async move {
            ctx.cancel();
            let relations: Relations<User, Book> =
                users.iter().map(|u| (u.id, vec![10])).collect();
            Ok::<_, BoxError>(relations)
        }),
        fetcher.clone(),
    );

    let err = books
        .preload(&CancellationToken::new(), &users(&[1]))
        .await
        .unwrap_err();

    assert!(matches!(err, PreloadError::Cancelled { ref relation } if relation == "books"));
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(books.cached_parents(), 0);
}

#[tokio::test]
async fn test_cancel_between_levels_keeps_parent_level() {
    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    chapter_resolver.relate(10, vec![100]);
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        MockFetcher::<Chapter>::new(),
    ));

    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10]);
    let books = Loadable::<User, Book>::new(
        "books",
        book_resolver,
        fetcher_fn(|ctx: CancellationToken, ids: Vec<u32>| async move {
            ctx.cancel();
            Ok::<_, BoxError>(ids.into_iter().map(|id| Book { id }).collect())
        }),
    )
    .with_child(chapters.clone());

    let err = preload(&CancellationToken::new(), &users(&[1]), &[&books])
        .await
        .unwrap_err();

    assert!(matches!(err, PreloadError::Cancelled { ref relation } if relation == "chapters"));
    assert_eq!(books.cached(&1), Some(vec![Book { id: 10 }]));
    assert_eq!(chapter_resolver.call_count(), 0);
    assert_eq!(chapters.cached_parents(), 0);
}

/// The root level resolves nothing, so the children get an empty batch. A cancelled token
/// still fails the call instead of reporting success.
#[tokio::test]
async fn test_cancel_reported_for_empty_child_batch() {
    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        MockFetcher::<Chapter>::new(),
    ));

    let fetcher = book_fetcher(&[]);
    let books = Loadable::<User, Book>::new(
        "books",
        resolver_fn(|ctx: CancellationToken, _users: Vec<User>| async move {
            ctx.cancel();
            Ok::<_, BoxError>(Relations::<User, Book>::new())
        }),
        fetcher.clone(),
    )
    .with_child(chapters);

    let err = books
        .preload(&CancellationToken::new(), &users(&[1]))
        .await
        .unwrap_err();

    assert!(matches!(err, PreloadError::Cancelled { ref relation } if relation == "chapters"));
    assert_eq!(books.cached(&1), Some(vec![]));
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(chapter_resolver.call_count(), 0);
}

#[tokio::test]
async fn test_repeated_parent_contributes_its_ids_once() {
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(1, vec![10, 11]).relate(2, vec![12]);
    let fetcher = book_fetcher(&[10, 11, 12]);

    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        MockFetcher::<Chapter>::new(),
    ));
    let books =
        Loadable::new("books", book_resolver, fetcher.clone()).with_child(chapters.clone());

    preload(&CancellationToken::new(), &users(&[1, 2, 1]), &[&books])
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), vec![vec![10, 11, 12]]);
    assert_eq!(chapter_resolver.calls(), vec![vec![10, 11, 12]]);
    assert_eq!(books.cached(&1), Some(vec![Book { id: 10 }, Book { id: 11 }]));
    assert_eq!(books.cached_parents(), 2);
}

#[tokio::test]
async fn test_with_children_attaches_in_order() {
    let chapter_resolver = MockResolver::<Book, Chapter>::new();
    chapter_resolver.relate(10, vec![100]);
    let chapter_fetcher = MockFetcher::<Chapter>::new();
    chapter_fetcher.with_nodes([Chapter { id: 100 }]);
    let chapters = Arc::new(Loadable::new(
        "chapters",
        chapter_resolver.clone(),
        chapter_fetcher,
    ));

    // Editor 7 is missing, which must not stop the chapters from loading first
    let editor_resolver = MockResolver::<Book, User>::new();
    editor_resolver.relate(10, vec![7]);
    let editors = Arc::new(HasOneLoadable::new(
        "editors",
        editor_resolver.clone(),
        MockFetcher::<User>::new(),
    ));

    let favourite_resolver = MockResolver::<User, Book>::new();
    favourite_resolver.relate(1, vec![10]);
    let favourite = HasOneLoadable::new("favourite", favourite_resolver, book_fetcher(&[10]))
        .with_children([
            chapters.clone() as Arc<dyn Preloadable<Book>>,
            editors.clone(),
        ]);

    let err = preload(&CancellationToken::new(), &users(&[1]), &[&favourite])
        .await
        .unwrap_err();

    assert!(matches!(err, PreloadError::NotFoundHasOne { ref relation, .. } if relation == "editors"));
    assert_eq!(favourite.cached(&1), Some(Book { id: 10 }));
    assert_eq!(chapters.cached(&10), Some(vec![Chapter { id: 100 }]));
    assert_eq!(editor_resolver.call_count(), 1);

    // The to-many builder takes the same list
    let book_resolver = MockResolver::<User, Book>::new();
    book_resolver.relate(2, vec![10]);
    let books = Loadable::new("books", book_resolver, book_fetcher(&[10]))
        .with_children(vec![chapters.clone() as Arc<dyn Preloadable<Book>>]);
    preload(&CancellationToken::new(), &users(&[2]), &[&books])
        .await
        .unwrap();
    assert_eq!(chapter_resolver.call_count(), 2);
}
