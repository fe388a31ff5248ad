use pretty_assertions::assert_eq;

use catalog::{
    backup::State,
    db, export,
    traits::*,
    types::{
        author::Author, book::Book, book_instance::BookInstance, status::Status,
        timestamp::Timestamp,
    },
    validation::ValidationErrors,
};

fn date(year: i32, month: u32, day: u32) -> Timestamp {
    Timestamp::from_ymd(year, month, day).unwrap()
}

async fn populate(conn: &sqlx::SqlitePool) -> (Author, Book, BookInstance) {
    let author = Author {
        date_of_birth: Some(date(1920, 1, 2)),
        date_of_death: Some(date(1992, 4, 6)),
        ..Author::new("Isaac", "Asimov")
    };
    author.insert(conn).await.unwrap();
    let book = Book::new("Foundation");
    book.insert(conn).await.unwrap();
    let book_instance = BookInstance::new(book.id.clone(), "Gnome Press, 1951")
        .with_status(Status::Loaned)
        .with_due_back(date(2023, 3, 15));
    book_instance.insert(conn).await.unwrap();
    (author, book, book_instance)
}

#[tokio::test]
async fn author_round_trip() {
    let conn = db::connect_in_memory().await.unwrap();
    let (author, _, _) = populate(&conn).await;

    let loaded = Author::get_by_id(&conn, &author.id).await.unwrap().unwrap();
    assert_eq!(loaded, author);
    assert_eq!(loaded.lifespan(), "( 1920 - 1992 )");

    let without_dates = Author::new("Ben", "Bova");
    without_dates.insert(&conn).await.unwrap();
    let loaded = Author::get_existing(&conn, &without_dates.id).await.unwrap();
    assert_eq!(loaded.date_of_birth, None);
    assert_eq!(loaded.lifespan(), "( N/A )");
}

#[tokio::test]
async fn authors_are_listed_by_family_name() {
    let conn = db::connect_in_memory().await.unwrap();
    for (first, family) in [("Ursula", "Le Guin"), ("Isaac", "Asimov"), ("Ben", "Bova")] {
        Author::new(first, family).insert(&conn).await.unwrap();
    }
    let names = Author::get_all(&conn)
        .await
        .unwrap()
        .iter()
        .map(Author::name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Isaac Asimov", "Ben Bova", "Ursula Le Guin"]);
}

#[tokio::test]
async fn invalid_author_is_not_written() {
    let conn = db::connect_in_memory().await.unwrap();
    let author = Author::new("", "x".repeat(101));
    let err = author.insert(&conn).await.unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert!(errors.has("first_name"));
    assert!(errors.has("family_name"));
    assert!(Author::get_all(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn entity_without_an_id_is_not_written() {
    let conn = db::connect_in_memory().await.unwrap();
    let author = Author {
        first_name:  "Isaac".to_string(),
        family_name: "Asimov".to_string(),
        ..Author::default()
    };
    let err = author.insert(&conn).await.unwrap_err();
    assert!(err.downcast_ref::<ValidationErrors>().unwrap().has("id"));

    let book = Book {
        title: "Foundation".to_string(),
        ..Book::default()
    };
    assert!(book.insert(&conn).await.is_err());
    assert!(State::load(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_keeps_the_id_and_validates() {
    let conn = db::connect_in_memory().await.unwrap();
    let (mut author, _, _) = populate(&conn).await;
    let id = author.id.clone();

    let new = Author {
        date_of_death: None,
        ..Author::new("Isaac", "Asimov")
    };
    author.update(&conn, new).await.unwrap();
    assert_eq!(author.id, id);
    let loaded = Author::get_existing(&conn, &id).await.unwrap();
    assert_eq!(loaded.lifespan(), "( N/A )");
    assert_eq!(loaded, author);

    let err = author
        .update(&conn, Author::new("Isaac", ""))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ValidationErrors>().is_some());
    assert_eq!(author.family_name, "Asimov");
}

#[tokio::test]
async fn book_instance_round_trip() {
    let conn = db::connect_in_memory().await.unwrap();
    let (_, book, book_instance) = populate(&conn).await;

    let loaded = BookInstance::get_existing(&conn, &book_instance.id)
        .await
        .unwrap();
    assert_eq!(loaded, book_instance);
    assert_eq!(loaded.due_back_formatted_ymd(), "2023-03-15");
    assert_eq!(loaded.book(&conn).await.unwrap(), Some(book.clone()));
    assert_eq!(book.instances(&conn).await.unwrap(), vec![book_instance]);
}

#[tokio::test]
async fn default_due_back_survives_storage() {
    let conn = db::connect_in_memory().await.unwrap();
    let book = Book::new("Foundation");
    book.insert(&conn).await.unwrap();
    let book_instance = BookInstance::new(book.id.clone(), "Gnome Press, 1951");
    book_instance.insert(&conn).await.unwrap();
    let loaded = BookInstance::get_existing(&conn, &book_instance.id)
        .await
        .unwrap();
    assert_eq!(loaded.due_back, book_instance.due_back);
    assert_eq!(loaded.status, Status::Maintenance);
}

#[tokio::test]
async fn status_outside_the_enumeration_is_rejected() {
    let conn = db::connect_in_memory().await.unwrap();
    let (_, book, _) = populate(&conn).await;
    let result = sqlx::query(
        "INSERT INTO bookinstances ( id, book, imprint, status, due_back ) VALUES ( ?1, ?2, ?3, ?4, ?5 );",
    )
    .bind("0a2ae995-4657-4814-86ca-df96e1b6ec0b")
    .bind(&book.id)
    .bind("Gnome Press, 1951")
    .bind("Borrowed")
    .bind(0_i64)
    .execute(&conn)
    .await;
    assert!(result.is_err());
    assert_eq!(BookInstance::get_all(&conn).await.unwrap().len(), 1);
}

#[tokio::test]
async fn status_can_change_freely() {
    let conn = db::connect_in_memory().await.unwrap();
    let (_, _, mut book_instance) = populate(&conn).await;
    for status in [Status::Available, Status::Reserved, Status::Maintenance] {
        let new = book_instance.clone().with_status(status);
        book_instance.update(&conn, new).await.unwrap();
        let loaded = BookInstance::get_existing(&conn, &book_instance.id)
            .await
            .unwrap();
        assert_eq!(loaded.status, status);
    }
}

#[tokio::test]
async fn remove() {
    let conn = db::connect_in_memory().await.unwrap();
    let (author, _, book_instance) = populate(&conn).await;
    author.remove(&conn).await.unwrap();
    book_instance.remove(&conn).await.unwrap();
    assert_eq!(Author::get_by_id(&conn, &author.id).await.unwrap(), None);
    assert!(BookInstance::get_all(&conn).await.unwrap().is_empty());
    assert!(author.remove(&conn).await.is_err());
    assert!(Author::get_existing(&conn, &author.id).await.is_err());
}

#[tokio::test]
async fn backup_restores_into_a_fresh_database() {
    let conn = db::connect_in_memory().await.unwrap();
    populate(&conn).await;
    Author::new("Ben", "Bova").insert(&conn).await.unwrap();
    let mut state = State::load(&conn).await.unwrap();
    state.sort();
    let json = state.serialize().unwrap();

    let restored = db::connect_in_memory().await.unwrap();
    State::deserialize(&json)
        .unwrap()
        .rebuild(&restored)
        .await
        .unwrap();
    let mut reloaded = State::load(&restored).await.unwrap();
    reloaded.sort();
    assert_eq!(reloaded, state);
}

#[tokio::test]
async fn failed_restore_leaves_the_database_empty() {
    let conn = db::connect_in_memory().await.unwrap();
    let state = State {
        authors:        vec![Author::new("Isaac", "Asimov")],
        books:          vec![Book::new("Foundation"), Book::new("")],
        book_instances: vec![],
    };
    let err = state.rebuild(&conn).await.unwrap_err();
    assert!(err.downcast_ref::<ValidationErrors>().unwrap().has("title"));
    assert!(State::load(&conn).await.unwrap().is_empty());

    let state = State {
        books: vec![Book::new("Foundation")],
        ..state
    };
    state.rebuild(&conn).await.unwrap();
    assert_eq!(Author::get_all(&conn).await.unwrap().len(), 1);
}

#[tokio::test]
async fn backup_reports_where_it_broke() {
    let err = State::deserialize(r#"{"authors": [{"id": 3}], "books": [], "book_instances": []}"#)
        .unwrap_err();
    assert!(err.to_string().starts_with("authors[0].id"));
}

#[tokio::test]
async fn export_authors_as_csv() {
    let conn = db::connect_in_memory().await.unwrap();
    let (author, _, _) = populate(&conn).await;
    let mut out = Vec::new();
    export::export_authors(&conn, &mut out).await.unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "Name,Lifespan,Date of Birth,Date of Death,URL\nIsaac Asimov,( 1920 - 1992 ),1920-01-02,1992-04-06,/catalog/author/{}\n",
            author.id
        )
    );
}

#[tokio::test]
async fn export_book_instances_as_csv() {
    let conn = db::connect_in_memory().await.unwrap();
    let (_, book, book_instance) = populate(&conn).await;
    let mut out = Vec::new();
    export::export_book_instances(&conn, &mut out).await.unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "Book Id,Imprint,Status,Due Back,URL\n{},\"Gnome Press, 1951\",Loaned,\"Mar 15, 2023\",/catalog/bookinstance/{}\n",
            book.id, book_instance.id
        )
    );
}
