//! Query planning and execution: conjunctive filters, ordering, paging and
//! item type separation.

use drivebit::{
    authorize, clear_all, get, init, save_item, test_lock, DriveError, ItemQuery, ItemType,
    NewItem, Order, OrderBy, Privacy, Scope, UserId, ViewerContext,
};
use std::sync::{MutexGuard, OnceLock};
use tempfile::TempDir;

static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

const ALICE: UserId = 10;
const BOB: UserId = 11;

fn setup() -> MutexGuard<'static, ()> {
    let lock = test_lock();
    let dir = TEST_DIR.get_or_init(|| TempDir::new().unwrap());
    init(dir.path().to_str().unwrap()).unwrap();
    clear_all().unwrap();
    lock
}

fn upload(owner: UserId, title: &str, privacy: Privacy) -> u64 {
    save_item(NewItem::file(owner, title).privacy(privacy)).unwrap()
}

// ============================================================================
// Planning (no store)
// ============================================================================

#[test]
fn plan_files_scope_for_visitor() {
    let ctx = ViewerContext::user(BOB).with_displayed_profile(ALICE);
    let plan = ItemQuery::in_scope(Scope::Files).plan(&ctx);
    assert_eq!(plan.author, Some(ALICE));
    assert_eq!(plan.privacy, Some(Privacy::Public));
    assert!(!plan.matches_nothing);
}

#[test]
fn plan_conflicting_owner_matches_nothing() {
    let ctx = ViewerContext::user(BOB).with_displayed_profile(ALICE);
    let plan = ItemQuery::by_user(BOB).scope(Scope::Files).plan(&ctx);
    assert!(plan.matches_nothing);

    let plan = ItemQuery::by_user(ALICE).scope(Scope::Files).plan(&ctx);
    assert!(!plan.matches_nothing);
    assert_eq!(plan.author, Some(ALICE));
}

#[test]
fn plan_anonymous_files_scope_matches_nothing() {
    let plan = ItemQuery::in_scope(Scope::Files).plan(&ViewerContext::anonymous());
    assert!(plan.matches_nothing);
}

#[test]
fn plan_normalizes_name_and_page() {
    let mut q = ItemQuery::by_name("");
    q.page = 0;
    let plan = q.plan(&ViewerContext::anonymous());
    assert_eq!(plan.slug, None);
    assert_eq!(plan.page, 1);
}

#[test]
fn query_descriptor_from_json() {
    let q: ItemQuery =
        serde_json::from_str(r#"{"name":"readme-txt","scope":"public","type":"folder"}"#).unwrap();
    assert_eq!(q.name.as_deref(), Some("readme-txt"));
    assert_eq!(q.scope, Scope::Public);
    assert_eq!(q.item_type, ItemType::Folder);
    assert_eq!(q.page, 1);
    assert_eq!(q.per_page, None);
}

// ============================================================================
// Authorization
// ============================================================================

#[test]
fn unscoped_query_requires_admin() {
    let q: ItemQuery = serde_json::from_str("{}").unwrap();
    assert!(matches!(authorize(&q, &ViewerContext::anonymous()), Err(DriveError::Forbidden(_))));
    assert!(matches!(authorize(&q, &ViewerContext::user(BOB)), Err(DriveError::Forbidden(_))));
    assert!(matches!(
        authorize(&ItemQuery::by_user(ALICE), &ViewerContext::anonymous()),
        Err(DriveError::Forbidden(_))
    ));
    assert_eq!(authorize(&q, &ViewerContext::admin(1)), Ok(()));
}

#[test]
fn admin_scope_requires_admin() {
    let q = ItemQuery::in_scope(Scope::Admin);
    assert!(matches!(authorize(&q, &ViewerContext::user(ALICE)), Err(DriveError::Forbidden(_))));
    assert_eq!(authorize(&q, &ViewerContext::admin(1)), Ok(()));
}

#[test]
fn profile_and_public_scopes_are_open() {
    let anon = ViewerContext::anonymous();
    assert_eq!(authorize(&ItemQuery::in_scope(Scope::Public), &anon), Ok(()));
    assert_eq!(authorize(&ItemQuery::in_scope(Scope::Files), &anon), Ok(()));
    assert_eq!(authorize(&ItemQuery::by_user(ALICE).scope(Scope::Public), &anon), Ok(()));
}

#[test]
fn authorized_anonymous_queries_never_see_private_files() {
    let _lock = setup();
    let public = upload(ALICE, "a1", Privacy::Public);
    upload(ALICE, "a2", Privacy::Private);
    let anon = ViewerContext::anonymous();

    let mut seen = Vec::new();
    for scope in [Scope::Admin, Scope::Files, Scope::Public, Scope::None] {
        let q = ItemQuery::by_user(ALICE).scope(scope);
        if authorize(&q, &anon).is_ok() {
            seen.extend(get(&q, &anon).unwrap().ids());
        }
    }
    assert_eq!(seen, vec![public]);
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn empty_query_lists_every_file() {
    let _lock = setup();
    upload(ALICE, "a.txt", Privacy::Private);
    upload(BOB, "b.txt", Privacy::Public);
    save_item(NewItem::folder(ALICE, "Photos")).unwrap();

    let rs = get(&ItemQuery::default(), &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.found, 2);
    assert!(rs.items.iter().all(|i| i.item_type == ItemType::File));
}

#[test]
fn folders_are_a_separate_type() {
    let _lock = setup();
    upload(ALICE, "Photos", Privacy::Public);
    let folder = save_item(NewItem::folder(ALICE, "Photos")).unwrap();

    let q = ItemQuery::by_name("photos").item_type(ItemType::Folder);
    let rs = get(&q, &ViewerContext::user(ALICE)).unwrap();
    assert_eq!(rs.ids(), vec![folder]);
}

#[test]
fn filters_are_conjunctive() {
    let _lock = setup();
    let a = upload(ALICE, "a.txt", Privacy::Public);
    upload(BOB, "b.txt", Privacy::Public);
    let ctx = ViewerContext::user(ALICE);

    let rs = get(&ItemQuery::by_id(a).name("b-txt"), &ctx).unwrap();
    assert!(rs.is_empty());

    let rs = get(&ItemQuery::by_id(a).user(BOB), &ctx).unwrap();
    assert!(rs.is_empty());

    let rs = get(&ItemQuery::by_id(a).name("a-txt").user(ALICE), &ctx).unwrap();
    assert_eq!(rs.ids(), vec![a]);
}

#[test]
fn by_id_respects_scope() {
    let _lock = setup();
    let private = upload(ALICE, "secret.txt", Privacy::Private);

    let rs = get(&ItemQuery::by_id(private).scope(Scope::Public), &ViewerContext::user(BOB)).unwrap();
    assert!(rs.is_empty());

    let rs = get(&ItemQuery::by_id(private).scope(Scope::Admin), &ViewerContext::user(BOB)).unwrap();
    assert_eq!(rs.found, 1);
}

#[test]
fn public_scope_with_user_filter() {
    let _lock = setup();
    let a1 = upload(ALICE, "a1", Privacy::Public);
    upload(ALICE, "a2", Privacy::Private);
    upload(BOB, "b1", Privacy::Public);

    let q = ItemQuery::by_user(ALICE).scope(Scope::Public);
    let rs = get(&q, &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.ids(), vec![a1]);
}

#[test]
fn admin_sees_private_files_on_any_profile() {
    let _lock = setup();
    upload(ALICE, "a1", Privacy::Private);
    upload(ALICE, "a2", Privacy::Private);
    upload(BOB, "b1", Privacy::Private);

    let ctx = ViewerContext::admin(1).with_displayed_profile(ALICE);
    let rs = get(&ItemQuery::in_scope(Scope::Files), &ctx).unwrap();
    assert_eq!(rs.found, 2);
    assert!(rs.items.iter().all(|i| i.owner == ALICE));
}

#[test]
fn anonymous_visitor_on_profile_sees_public_files() {
    let _lock = setup();
    let public = upload(ALICE, "a1", Privacy::Public);
    upload(ALICE, "a2", Privacy::Private);

    let ctx = ViewerContext::anonymous().with_displayed_profile(ALICE);
    let rs = get(&ItemQuery::in_scope(Scope::Files), &ctx).unwrap();
    assert_eq!(rs.ids(), vec![public]);

    let rs = get(&ItemQuery::in_scope(Scope::Files), &ViewerContext::anonymous()).unwrap();
    assert!(rs.is_empty());
}

// ============================================================================
// Ordering and paging
// ============================================================================

#[test]
fn default_order_is_newest_first() {
    let _lock = setup();
    let first = upload(ALICE, "one", Privacy::Public);
    let second = upload(ALICE, "two", Privacy::Public);
    let third = upload(ALICE, "three", Privacy::Public);

    let rs = get(&ItemQuery::default(), &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.ids(), vec![third, second, first]);
}

#[test]
fn order_by_title_ignores_case() {
    let _lock = setup();
    let c = upload(ALICE, "charlie", Privacy::Public);
    let a = upload(ALICE, "Alpha", Privacy::Public);
    let b = upload(ALICE, "bravo", Privacy::Public);

    let q = ItemQuery::default().order_by(OrderBy::Title, Order::Asc);
    let rs = get(&q, &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.ids(), vec![a, b, c]);
}

#[test]
fn paging_keeps_total_count() {
    let _lock = setup();
    let ids: Vec<u64> = (0..5).map(|i| upload(ALICE, &format!("f{}", i), Privacy::Public)).collect();

    let q = ItemQuery::default().order_by(OrderBy::Id, Order::Asc).paged(2, 2);
    let rs = get(&q, &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.found, 5);
    assert_eq!(rs.ids(), vec![ids[2], ids[3]]);

    let q = ItemQuery::default().order_by(OrderBy::Id, Order::Asc).paged(3, 2);
    let rs = get(&q, &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.ids(), vec![ids[4]]);

    let q = ItemQuery::default().paged(9, 2);
    let rs = get(&q, &ViewerContext::anonymous()).unwrap();
    assert_eq!(rs.found, 5);
    assert!(rs.items.is_empty());
}
