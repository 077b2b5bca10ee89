use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use trol::command::Command;
use trol::{
    Config, Database, Entity, EntityRef, Field, FieldKind, Hash, Json, KeyPath, List,
    MemoryConnection, ModelSchema, Property, Schema, ScoreBound, Set, SortedSet, TrolError,
};

const NAME: Property<String> = Property::new("name");
const FOUNDED: Property<i64> = Property::new("founded");
const ABV: Property<f64> = Property::new("abv");
const ORGANIC: Property<bool> = Property::new("organic");
const LOGO: Property<Vec<u8>> = Property::new("logo");
const DETAILS: Property<Json<Details>> = Property::new("details");
const BREWERY: Property<EntityRef> = Property::new("brewery");
const BEERS: Set<String> = Set::new("beers");
const RATINGS: SortedSet<String> = SortedSet::new("ratings");
const TAPS: List<String> = List::new("taps");
const STOCK: Hash<i64> = Hash::new("stock");
const VISITS: Property<u64> = Property::new("visits");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Details {
    city: String,
    taps: u32,
}

struct Fixture {
    db: Database<MemoryConnection>,
    conn: MemoryConnection,
    brewery: Arc<ModelSchema>,
    beer: Arc<ModelSchema>,
}

fn fixture() -> Fixture {
    let brewery = ModelSchema::builder("Brewery")
        .field(&NAME)
        .field(&FOUNDED)
        .field(&ORGANIC)
        .field(&LOGO)
        .field(&DETAILS)
        .field(&BEERS)
        .field(&RATINGS)
        .field(&TAPS)
        .field(&STOCK)
        .build()
        .unwrap();
    let beer = ModelSchema::builder("Beer")
        .field(&NAME)
        .field(&ABV)
        .field(&BREWERY)
        .build()
        .unwrap();
    let schema = Schema::builder()
        .field(&VISITS)
        .model(&brewery)
        .model(&beer)
        .build()
        .unwrap();
    let conn = MemoryConnection::new();
    let db = Database::with_connection(conn.clone(), schema);
    Fixture {
        db,
        conn,
        brewery,
        beer,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_brewery_name_round_trip() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let name = NAME.on(&frmt).unwrap();
    assert_eq!(name.key(), "Brewery:frmt:name");

    name.set(&f.db, &"Fremont Brewing Company".to_string())
        .await
        .unwrap();
    assert!(f.conn.contains_key("Brewery:frmt:name").await);
    assert_eq!(
        name.get(&f.db).await.unwrap().as_deref(),
        Some("Fremont Brewing Company")
    );

    assert!(name.delete(&f.db).await.unwrap());
    assert!(!f.conn.contains_key("Brewery:frmt:name").await);
    assert_eq!(name.get(&f.db).await.unwrap(), None);
    assert!(!name.delete(&f.db).await.unwrap());
}

#[tokio::test]
async fn test_each_accessor_sends_one_command() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let name = NAME.on(&frmt).unwrap();
    let beers = BEERS.on(&frmt).unwrap();
    let ratings = RATINGS.on(&frmt).unwrap();
    let taps = TAPS.on(&frmt).unwrap();
    let stock = STOCK.on(&frmt).unwrap();

    macro_rules! one_command {
        ($call:expr, $name:expr) => {
            f.conn.clear_log().await;
            $call.await.unwrap();
            assert_eq!(f.conn.command_names().await, vec![$name]);
        };
    }

    one_command!(name.set(&f.db, &"Fremont".to_string()), "SET");
    one_command!(name.get(&f.db), "GET");
    one_command!(name.exists(&f.db), "EXISTS");
    one_command!(beers.add_many(&f.db, &strings(&["a", "b", "c"])), "SADD");
    one_command!(beers.members(&f.db), "SMEMBERS");
    one_command!(beers.contains(&f.db, &"a".to_string()), "SISMEMBER");
    let scored = [("a".to_string(), 1.0), ("b".to_string(), 2.0)];
    one_command!(ratings.add_many(&f.db, &scored), "ZADD");
    one_command!(ratings.range_with_scores(&f.db, 0, -1), "ZRANGE");
    one_command!(taps.push_back_many(&f.db, &strings(&["x", "y"])), "RPUSH");
    one_command!(taps.all(&f.db), "LRANGE");
    one_command!(stock.set_many(&f.db, &[("ipa", 3), ("stout", 4)]), "HSET");
    one_command!(stock.all(&f.db), "HGETALL");
    one_command!(beers.clear(&f.db), "DEL");
}

#[tokio::test]
async fn test_empty_bulk_operations_send_nothing() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();

    assert_eq!(BEERS.on(&frmt).unwrap().add_many(&f.db, &[]).await.unwrap(), 0);
    assert_eq!(RATINGS.on(&frmt).unwrap().remove_many(&f.db, &[]).await.unwrap(), 0);
    assert_eq!(STOCK.on(&frmt).unwrap().set_many(&f.db, &[]).await.unwrap(), 0);
    assert!(STOCK.on(&frmt).unwrap().get_many(&f.db, &[]).await.unwrap().is_empty());
    frmt.write().commit(&f.db).await.unwrap();
    assert_eq!(f.conn.command_count().await, 0);
}

#[tokio::test]
async fn test_typed_properties() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let ipa = f.beer.entity("interurban").unwrap();

    FOUNDED.on(&frmt).unwrap().set(&f.db, &2009).await.unwrap();
    ORGANIC.on(&frmt).unwrap().set(&f.db, &false).await.unwrap();
    LOGO.on(&frmt).unwrap().set(&f.db, &vec![0x89, 0x50, 0x4e, 0x47]).await.unwrap();
    let details = Json(Details {
        city: "Seattle".to_string(),
        taps: 12,
    });
    DETAILS.on(&frmt).unwrap().set(&f.db, &details).await.unwrap();
    ABV.on(&ipa).unwrap().set(&f.db, &6.2).await.unwrap();
    BREWERY.on(&ipa).unwrap().set(&f.db, &frmt.to_ref()).await.unwrap();

    assert_eq!(FOUNDED.on(&frmt).unwrap().get(&f.db).await.unwrap(), Some(2009));
    assert_eq!(ORGANIC.on(&frmt).unwrap().get(&f.db).await.unwrap(), Some(false));
    assert_eq!(
        LOGO.on(&frmt).unwrap().get(&f.db).await.unwrap(),
        Some(vec![0x89, 0x50, 0x4e, 0x47])
    );
    assert_eq!(DETAILS.on(&frmt).unwrap().get(&f.db).await.unwrap(), Some(details));
    assert_eq!(ABV.on(&ipa).unwrap().get(&f.db).await.unwrap(), Some(6.2));

    let reference = BREWERY.on(&ipa).unwrap().get(&f.db).await.unwrap().unwrap();
    let resolved: Entity = reference.resolve(f.db.schema()).unwrap();
    assert_eq!(resolved.key(), "Brewery:frmt");

    // Stored in readable form.
    let raw = f
        .db
        .execute(Command::new("GET").arg("Brewery:frmt:organic"))
        .await
        .unwrap()
        .bulk()
        .unwrap();
    assert_eq!(raw.as_deref(), Some(&b"False"[..]));
}

#[tokio::test]
async fn test_coercion_error_names_field_and_value() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    f.db.execute(Command::new("SET").arg("Brewery:frmt:founded").arg("last year"))
        .await
        .unwrap();

    let err = FOUNDED.on(&frmt).unwrap().get(&f.db).await.unwrap_err();
    match err {
        TrolError::Coercion { field, value, .. } => {
            assert_eq!(field, "founded");
            assert_eq!(value, "last year");
        }
        other => panic!("expected a coercion error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undeclared_field_is_rejected() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let err = ABV.on(&frmt).err().unwrap();
    assert!(matches!(
        err,
        TrolError::UndeclaredField { ref holder, ref field }
            if holder == "Brewery" && field == "abv"
    ));

    // Same name, different type.
    assert!(Property::<String>::new("founded").on(&frmt).is_err());
    assert!(Set::<String>::new("name").on(&frmt).is_err());
}

#[tokio::test]
async fn test_invalid_identity_fails_before_any_command() {
    let f = fixture();
    assert!(matches!(
        f.brewery.entity("fr:mt"),
        Err(TrolError::InvalidIdentity(..))
    ));
    assert!(f.brewery.entity("").is_err());
    assert_eq!(f.conn.command_count().await, 0);
}

#[tokio::test]
async fn test_server_errors_are_surfaced() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    f.db.execute(Command::new("SET").arg("Brewery:frmt:beers").arg("oops"))
        .await
        .unwrap();
    let err = BEERS
        .on(&frmt)
        .unwrap()
        .add(&f.db, &"IPA".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, TrolError::Server(ref msg) if msg.starts_with("WRONGTYPE")));
    assert!(!err.is_transport());
}

#[tokio::test(start_paused = true)]
async fn test_property_ttl() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let name = NAME.on(&frmt).unwrap();

    name.set_with_ttl(&f.db, &"Pop-up".to_string(), Duration::from_millis(1500))
        .await
        .unwrap();
    assert_eq!(name.ttl(&f.db).await.unwrap(), Some(Duration::from_millis(1500)));

    tokio::time::advance(Duration::from_millis(1000)).await;
    assert!(name.exists(&f.db).await.unwrap());
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(name.get(&f.db).await.unwrap(), None);

    name.set(&f.db, &"Fremont".to_string()).await.unwrap();
    assert_eq!(name.ttl(&f.db).await.unwrap(), None);
    assert!(name.expire(&f.db, Duration::from_secs(10)).await.unwrap());
    assert_eq!(name.ttl(&f.db).await.unwrap(), Some(Duration::from_secs(10)));
    // A plain SET clears the expiry.
    name.set(&f.db, &"Fremont".to_string()).await.unwrap();
    assert_eq!(name.ttl(&f.db).await.unwrap(), None);
}

#[tokio::test]
async fn test_set_if_absent() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let founded = FOUNDED.on(&frmt).unwrap();
    assert!(founded.set_if_absent(&f.db, &2009).await.unwrap());
    assert!(!founded.set_if_absent(&f.db, &1999).await.unwrap());
    assert_eq!(founded.get(&f.db).await.unwrap(), Some(2009));
}

#[tokio::test]
async fn test_write_batch_uses_one_mset() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let batch = frmt
        .write()
        .set(&NAME, &"Fremont Brewing Company".to_string())
        .unwrap()
        .set(&FOUNDED, &2009)
        .unwrap()
        .set(&ORGANIC, &true)
        .unwrap();
    assert_eq!(batch.len(), 3);
    batch.commit(&f.db).await.unwrap();
    assert_eq!(f.conn.command_names().await, vec!["MSET"]);

    assert_eq!(ORGANIC.on(&frmt).unwrap().get(&f.db).await.unwrap(), Some(true));
    assert!(frmt.write().set(&ABV, &5.0).is_err());
}

#[tokio::test]
async fn test_entity_delete() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    frmt.write()
        .set(&NAME, &"Fremont".to_string())
        .unwrap()
        .set(&FOUNDED, &2009)
        .unwrap()
        .commit(&f.db)
        .await
        .unwrap();
    BEERS.on(&frmt).unwrap().add(&f.db, &"IPA".to_string()).await.unwrap();

    f.conn.clear_log().await;
    assert_eq!(frmt.delete(&f.db, &[&FOUNDED]).await.unwrap(), 1);
    assert_eq!(frmt.delete(&f.db, &[]).await.unwrap(), 2);
    assert_eq!(f.conn.command_names().await, vec!["DEL", "DEL"]);
    assert!(f.conn.keys().await.is_empty());
}

#[tokio::test]
async fn test_global_field() {
    let f = fixture();
    let visits = VISITS.on(f.db.schema()).unwrap();
    assert_eq!(visits.key(), "visits");
    visits.set(&f.db, &41).await.unwrap();
    assert_eq!(visits.get(&f.db).await.unwrap(), Some(41));
    assert!(NAME.on(f.db.schema()).is_err());
}

#[tokio::test]
async fn test_keys_and_describe() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    NAME.on(&frmt).unwrap().set(&f.db, &"Fremont".to_string()).await.unwrap();
    STOCK.on(&frmt).unwrap().set(&f.db, "ipa", &3).await.unwrap();
    VISITS.on(f.db.schema()).unwrap().set(&f.db, &1).await.unwrap();

    let keys = f.db.keys("Brewery:frmt:*").await.unwrap();
    assert_eq!(keys, strings(&["Brewery:frmt:name", "Brewery:frmt:stock"]));

    let stock = f.db.schema().describe("Brewery:frmt:stock").unwrap();
    assert_eq!(stock.field.unwrap().kind, FieldKind::Hash);
    assert_eq!(
        f.db.key_type("Brewery:frmt:stock").await.unwrap(),
        FieldKind::Hash.redis_type()
    );
    assert_eq!(
        f.db.schema().describe("visits").unwrap().path,
        KeyPath::parse("visits").unwrap()
    );
    assert_eq!(f.db.key_type("Brewery:frmt:nothing").await.unwrap(), "none");
}

#[tokio::test]
async fn test_set_operations() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let elysian = f.brewery.entity("elysian").unwrap();
    let ours = BEERS.on(&frmt).unwrap();
    let theirs = BEERS.on(&elysian).unwrap();

    assert_eq!(ours.add_many(&f.db, &strings(&["ipa", "stout", "pils"])).await.unwrap(), 3);
    assert!(!ours.add(&f.db, &"ipa".to_string()).await.unwrap());
    theirs.add_many(&f.db, &strings(&["ipa", "sour"])).await.unwrap();

    assert_eq!(ours.len(&f.db).await.unwrap(), 3);
    assert!(ours.contains(&f.db, &"stout".to_string()).await.unwrap());
    assert_eq!(ours.members(&f.db).await.unwrap(), strings(&["ipa", "pils", "stout"]));
    assert_eq!(
        ours.union(&f.db, &[&theirs]).await.unwrap(),
        strings(&["ipa", "pils", "sour", "stout"])
    );
    assert_eq!(ours.intersection(&f.db, &[&theirs]).await.unwrap(), strings(&["ipa"]));
    assert_eq!(ours.difference(&f.db, &[&theirs]).await.unwrap(), strings(&["pils", "stout"]));
    assert!(!ours.is_disjoint(&f.db, &theirs).await.unwrap());

    assert_eq!(ours.difference_update(&f.db, &[&theirs]).await.unwrap(), 2);
    assert!(ours.is_disjoint(&f.db, &theirs).await.unwrap());
    assert_eq!(theirs.union_store(&f.db, &ours, &[]).await.unwrap(), 2);
    assert_eq!(ours.members(&f.db).await.unwrap(), strings(&["ipa", "sour"]));

    assert!(ours.remove(&f.db, &"ipa".to_string()).await.unwrap());
    let popped = ours.pop(&f.db).await.unwrap();
    assert_eq!(popped.as_deref(), Some("sour"));
    assert_eq!(ours.pop(&f.db).await.unwrap(), None);
    assert!(!ours.exists(&f.db).await.unwrap());
}

#[tokio::test]
async fn test_sorted_set_operations() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let ratings = RATINGS.on(&frmt).unwrap();
    let entries: Vec<(String, f64)> = [("ipa", 4.5), ("stout", 3.0), ("pils", 4.0), ("sour", 2.5)]
        .into_iter()
        .map(|(m, s)| (m.to_string(), s))
        .collect();

    assert_eq!(ratings.add_many(&f.db, &entries).await.unwrap(), 4);
    assert_eq!(ratings.len(&f.db).await.unwrap(), 4);
    assert_eq!(ratings.rank(&f.db, &"ipa".to_string()).await.unwrap(), Some(3));
    assert_eq!(ratings.rev_rank(&f.db, &"ipa".to_string()).await.unwrap(), Some(0));
    assert_eq!(ratings.rank(&f.db, &"lager".to_string()).await.unwrap(), None);
    assert_eq!(ratings.score(&f.db, &"pils".to_string()).await.unwrap(), Some(4.0));
    assert_eq!(ratings.incr_by(&f.db, &"stout".to_string(), 1.5).await.unwrap(), 4.5);

    assert_eq!(
        ratings.range(&f.db, 0, 1).await.unwrap(),
        strings(&["sour", "pils"])
    );
    assert_eq!(
        ratings.rev_range_with_scores(&f.db, 0, 0).await.unwrap(),
        vec![("stout".to_string(), 4.5)]
    );
    assert_eq!(
        ratings
            .range_by_score(&f.db, ScoreBound::Exclusive(2.5), ScoreBound::PosInf, Some((0, 2)))
            .await
            .unwrap(),
        strings(&["pils", "ipa"])
    );
    assert_eq!(
        ratings
            .rev_range_by_score(&f.db, ScoreBound::Inclusive(4.5), ScoreBound::NegInf, None)
            .await
            .unwrap(),
        strings(&["stout", "ipa", "pils", "sour"])
    );
    assert_eq!(
        ratings
            .count(&f.db, ScoreBound::Inclusive(4.0), ScoreBound::Inclusive(4.5))
            .await
            .unwrap(),
        3
    );

    assert_eq!(
        ratings
            .remove_range_by_score(&f.db, ScoreBound::NegInf, ScoreBound::Exclusive(4.0))
            .await
            .unwrap(),
        1
    );
    assert_eq!(ratings.remove_range_by_rank(&f.db, -1, -1).await.unwrap(), 1);
    assert_eq!(
        ratings.range_with_scores(&f.db, 0, -1).await.unwrap(),
        vec![("pils".to_string(), 4.0), ("ipa".to_string(), 4.5)]
    );
    assert!(ratings.remove(&f.db, &"pils".to_string()).await.unwrap());
}

#[tokio::test]
async fn test_list_operations() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let elysian = f.brewery.entity("elysian").unwrap();
    let taps = TAPS.on(&frmt).unwrap();
    let other = TAPS.on(&elysian).unwrap();

    assert_eq!(taps.push_back_many(&f.db, &strings(&["ipa", "stout", "ipa"])).await.unwrap(), 3);
    assert_eq!(taps.push_front(&f.db, &"pils".to_string()).await.unwrap(), 4);
    assert_eq!(taps.all(&f.db).await.unwrap(), strings(&["pils", "ipa", "stout", "ipa"]));
    assert_eq!(taps.index(&f.db, -1).await.unwrap().as_deref(), Some("ipa"));
    assert_eq!(taps.index(&f.db, 10).await.unwrap(), None);

    taps.set(&f.db, 1, &"hazy ipa".to_string()).await.unwrap();
    assert!(taps.set(&f.db, 10, &"nope".to_string()).await.is_err());
    assert_eq!(taps.remove(&f.db, 0, &"ipa".to_string()).await.unwrap(), 1);
    assert_eq!(taps.range(&f.db, 0, -1).await.unwrap(), strings(&["pils", "hazy ipa", "stout"]));

    assert_eq!(taps.pop_back_into(&f.db, &other).await.unwrap().as_deref(), Some("stout"));
    assert_eq!(other.all(&f.db).await.unwrap(), strings(&["stout"]));

    taps.trim(&f.db, 1, 1).await.unwrap();
    assert_eq!(taps.all(&f.db).await.unwrap(), strings(&["hazy ipa"]));
    assert_eq!(taps.pop_front(&f.db).await.unwrap().as_deref(), Some("hazy ipa"));
    assert_eq!(taps.pop_back(&f.db).await.unwrap(), None);
    assert_eq!(taps.len(&f.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_hash_operations() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let stock = STOCK.on(&frmt).unwrap();

    assert_eq!(stock.set_many(&f.db, &[("ipa", 12), ("stout", 4)]).await.unwrap(), 2);
    assert!(!stock.set(&f.db, "ipa", &10).await.unwrap());
    assert_eq!(stock.get(&f.db, "ipa").await.unwrap(), Some(10));
    assert_eq!(
        stock.get_many(&f.db, &["stout", "sour"]).await.unwrap(),
        vec![Some(4), None]
    );
    assert_eq!(stock.incr_by(&f.db, "stout", -1).await.unwrap(), 3);
    assert!(stock.contains(&f.db, "stout").await.unwrap());
    assert_eq!(stock.len(&f.db).await.unwrap(), 2);
    assert_eq!(stock.fields(&f.db).await.unwrap(), strings(&["ipa", "stout"]));
    assert_eq!(stock.values(&f.db).await.unwrap(), vec![10, 3]);
    assert_eq!(
        stock.all(&f.db).await.unwrap(),
        vec![("ipa".to_string(), 10), ("stout".to_string(), 3)]
    );
    assert_eq!(stock.remove_many(&f.db, &["ipa", "sour"]).await.unwrap(), 1);
    assert!(stock.remove(&f.db, "stout").await.unwrap());
    assert!(!f.conn.contains_key("Brewery:frmt:stock").await);
}

#[tokio::test(start_paused = true)]
async fn test_collection_expire() {
    let f = fixture();
    let frmt = f.brewery.entity("frmt").unwrap();
    let beers = BEERS.on(&frmt).unwrap();
    assert!(!beers.expire(&f.db, Duration::from_secs(1)).await.unwrap());
    beers.add(&f.db, &"ipa".to_string()).await.unwrap();
    assert!(beers.expire(&f.db, Duration::from_secs(1)).await.unwrap());
    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(beers.len(&f.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_shared_database_across_tasks() {
    let f = fixture();
    let db = Arc::new(f.db);
    let frmt = f.brewery.entity("frmt").unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let db = Arc::clone(&db);
        let stock = STOCK.on(&frmt).unwrap();
        tasks.push(tokio::spawn(async move {
            stock.incr_by(&db, "ipa", 1).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(STOCK.on(&frmt).unwrap().get(&db, "ipa").await.unwrap(), Some(16));
    assert_eq!(f.conn.command_count().await, 17);
}

#[test]
fn test_commands_match_redis_rs_encoding() {
    let ours = Command::new("SET")
        .arg("Brewery:frmt:name")
        .arg("Fremont Brewing Company");
    let theirs = redis::cmd("SET")
        .arg("Brewery:frmt:name")
        .arg("Fremont Brewing Company")
        .get_packed_command();
    assert_eq!(ours.to_resp().serialize(), theirs);

    let ours = Command::new("ZADD").arg("Brewery:frmt:ratings").float_arg(4.5).arg(vec![0u8, 0xff]);
    let theirs = redis::cmd("ZADD")
        .arg("Brewery:frmt:ratings")
        .arg("4.5")
        .arg(&[0u8, 0xff][..])
        .get_packed_command();
    assert_eq!(ours.to_resp().serialize(), theirs);
}

#[test]
fn test_field_specs() {
    assert_eq!(BEERS.spec().kind, FieldKind::Set);
    assert_eq!(RATINGS.spec().kind.redis_type(), "zset");
    assert_eq!(NAME.spec().name, "name");
}

/// Runs against a real server when `TROL_REDIS_URL` is set, e.g.
/// `TROL_REDIS_URL=redis://127.0.0.1:6379/15 cargo test live_`.
#[tokio::test]
async fn test_live_server_round_trip() {
    let Ok(url) = std::env::var("TROL_REDIS_URL") else {
        return;
    };
    let config = Config::from_url(&url).unwrap();
    let brewery = ModelSchema::builder("Brewery")
        .field(&NAME)
        .field(&BEERS)
        .build()
        .unwrap();
    let schema = Schema::builder().model(&brewery).build().unwrap();
    let db = Database::open(&config, schema).await.unwrap();
    db.ping().await.unwrap();

    let identity = format!("trol-test-{:016x}", rand::random::<u64>());
    let entity = brewery.entity(&identity).unwrap();
    let name = NAME.on(&entity).unwrap();
    name.set(&db, &"Fremont Brewing Company".to_string()).await.unwrap();
    assert_eq!(
        name.get(&db).await.unwrap().as_deref(),
        Some("Fremont Brewing Company")
    );
    let beers = BEERS.on(&entity).unwrap();
    beers.add_many(&db, &strings(&["ipa", "stout"])).await.unwrap();
    assert_eq!(beers.len(&db).await.unwrap(), 2);

    assert_eq!(entity.delete(&db, &[]).await.unwrap(), 2);
    assert_eq!(name.get(&db).await.unwrap(), None);
    db.close().await.unwrap();
}
