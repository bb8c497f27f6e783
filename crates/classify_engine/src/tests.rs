//! End-to-end round trips through the derive, the engine and both formats.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use std::collections::HashMap;

use crate::{
    Bytes, Classifier, Classify, ClassifyError, ClassifyOptions, Deferred, JsonFormat, KeyValuePair, Strictness,
    XmlElement, XmlFormat,
};

fn xml() -> Classifier<XmlFormat> {
    Classifier::new(XmlFormat)
}

fn strict_xml() -> Classifier<XmlFormat> {
    Classifier::new(XmlFormat).with_options(ClassifyOptions::default().with_strictness(Strictness::Strict))
}

fn child<'e>(element: &'e XmlElement, name: &str) -> &'e XmlElement {
    element
        .child(name)
        .unwrap_or_else(|| panic!("`{}` has no child `{name}`", element.name))
}

fn child_mut<'e>(element: &'e mut XmlElement, name: &str) -> &'e mut XmlElement {
    element.children.iter_mut().find(|c| c.name == name).unwrap()
}

fn data_path(err: ClassifyError) -> String {
    match err {
        ClassifyError::Data { path, .. } => path,
        other => panic!("expected a data error, found {other:?}"),
    }
}

// -----------------------------------------------------------------------------
// Nested objects and leaf encodings

#[derive(Classify, Default, Debug, PartialEq)]
struct Person {
    #[classify(rename = "Name")]
    name: String,
    #[classify(rename = "Tags")]
    tags: Vec<String>,
    #[classify(rename = "Self")]
    self_ref: Option<Box<Person>>,
}

fn bob() -> Person {
    Person {
        name: String::from("Bob\nSmith"),
        tags: vec![String::from("a"), String::from("b")],
        self_ref: None,
    }
}

#[test]
fn person_layout_and_round_trip() {
    let element = xml().to_element(&bob()).unwrap();
    assert_eq!(element.name, "Person");

    let name = child(&element, "Name");
    assert_eq!(name.attribute("encoding"), Some("c-literal"));
    assert_eq!(name.text(), "Bob\\nSmith");

    let tags: Vec<&str> = child(&element, "Tags")
        .children
        .iter()
        .map(|item| {
            assert_eq!(item.name, "item");
            item.text()
        })
        .collect();
    assert_eq!(tags, ["a", "b"]);

    assert_eq!(child(&element, "Self").attribute("null"), Some("1"));

    let back: Person = xml().from_element(&element).unwrap();
    assert_eq!(back, bob());
}

#[test]
fn person_survives_text_and_files() {
    let nested = Person {
        self_ref: Some(Box::new(bob())),
        ..Person::default()
    };

    let bytes = xml().to_bytes(&nested).unwrap();
    let text = core::str::from_utf8(&bytes).unwrap();
    assert!(text.contains("encoding=\"c-literal\""));
    assert_eq!(xml().from_bytes::<Person>(&bytes).unwrap(), nested);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people").join("bob.xml");
    xml().write_to_file(&nested, &path).unwrap();
    assert_eq!(xml().read_from_file::<Person>(&path).unwrap(), nested);
}

#[derive(Classify, Default, Debug, PartialEq)]
struct Texts {
    plain: String,
    multiline: String,
    bell: char,
    blob: Bytes,
}

#[test]
fn leaf_encodings_are_selected_per_value() {
    let texts = Texts {
        plain: String::from("hello world"),
        multiline: String::from("one\ttwo\n"),
        bell: '\u{7}',
        blob: Bytes(vec![0, 1, 2, 255]),
    };
    let element = xml().to_element(&texts).unwrap();

    assert_eq!(child(&element, "plain").attribute("encoding"), None);
    assert_eq!(child(&element, "multiline").attribute("encoding"), Some("c-literal"));
    assert_eq!(child(&element, "bell").attribute("encoding"), Some("codepoint"));
    assert_eq!(child(&element, "bell").text(), "7");
    assert_eq!(child(&element, "blob").attribute("encoding"), Some("base64"));
    assert_eq!(child(&element, "blob").text(), "AAEC/w==");

    assert_eq!(xml().from_element::<Texts>(&element).unwrap(), texts);
}

// -----------------------------------------------------------------------------
// Schema evolution

#[derive(Classify, Default, Debug, PartialEq)]
#[classify(rename = "Item")]
struct ItemV1 {
    a: u32,
    b: String,
}

#[derive(Classify, Default, Debug, PartialEq)]
#[classify(rename = "Item")]
struct ItemV2 {
    a: u32,
    b: String,
    c: Vec<u8>,
}

#[test]
fn added_and_removed_fields_are_tolerated() {
    let old = ItemV1 {
        a: 3,
        b: String::from("x"),
    };
    let element = xml().to_element(&old).unwrap();
    let newer: ItemV2 = strict_xml().from_element(&element).unwrap();
    assert_eq!(
        newer,
        ItemV2 {
            a: 3,
            b: String::from("x"),
            c: Vec::new(),
        }
    );

    let newer = ItemV2 {
        a: 9,
        b: String::from("y"),
        c: vec![1, 2],
    };
    let element = xml().to_element(&newer).unwrap();
    let older: ItemV1 = strict_xml().from_element(&element).unwrap();
    assert_eq!(
        older,
        ItemV1 {
            a: 9,
            b: String::from("y"),
        }
    );
}

// -----------------------------------------------------------------------------
// Lenient and strict reading

#[derive(Classify, Default, Debug, PartialEq)]
struct Numbers {
    count: u32,
    name: String,
    values: Vec<u8>,
}

fn bad_numbers() -> XmlElement {
    XmlElement::new("Numbers")
        .with_child(XmlElement::new("count").with_text("lots"))
        .with_child(XmlElement::new("name").with_text("x"))
        .with_child(
            XmlElement::new("values")
                .with_child(XmlElement::new("item").with_text("1"))
                .with_child(XmlElement::new("item").with_text("300")),
        )
}

#[test]
fn lenient_reading_keeps_defaults() {
    let numbers: Numbers = xml().from_element(&bad_numbers()).unwrap();
    assert_eq!(
        numbers,
        Numbers {
            count: 0,
            name: String::from("x"),
            values: Vec::new(),
        }
    );
}

#[test]
fn strict_reading_reports_the_path() {
    let err = strict_xml().from_element::<Numbers>(&bad_numbers()).unwrap_err();
    assert_eq!(data_path(err), "root.count");

    let mut element = bad_numbers();
    child_mut(&mut element, "count").text = Some(String::from("12"));
    let err = strict_xml().from_element::<Numbers>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.values[1]");
}

#[test]
fn null_for_a_required_value_is_bad_data() {
    let element = XmlElement::new("Numbers").with_child(XmlElement::new("count").with_attribute("null", "1"));
    let err = strict_xml().from_element::<Numbers>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.count");
}

#[test]
fn unknown_encoding_aborts_the_read() {
    let element =
        XmlElement::new("Numbers").with_child(XmlElement::new("name").with_attribute("encoding", "rot13"));
    let err = xml().from_element::<Numbers>(&element).unwrap_err();
    assert!(matches!(err, ClassifyError::Format(_)));
}

// -----------------------------------------------------------------------------
// Configuration errors

#[derive(Classify, Default)]
struct MisusedFollowId {
    #[classify(follow_id)]
    doc: String,
}

#[derive(Classify, Default)]
struct ClashingNames {
    a: u8,
    #[classify(rename = "a")]
    b: u8,
}

#[derive(Classify, Default)]
struct MisusedCapture {
    #[classify(captures_id)]
    id: u32,
}

#[derive(Classify, Default, Debug, PartialEq)]
struct Counter {
    value: i32,
}

fn is_configuration<T>(result: Result<T, ClassifyError>) -> bool {
    matches!(result, Err(ClassifyError::Configuration { .. }))
}

#[test]
fn invalid_descriptors_fail_every_time() {
    for _ in 0..2 {
        assert!(is_configuration(xml().to_element(&MisusedFollowId::default())));
        assert!(is_configuration(xml().to_element(&ClashingNames::default())));
        assert!(is_configuration(xml().to_element(&MisusedCapture::default())));
    }

    // Never recovered, even under the lenient policy.
    let element = XmlElement::new("MisusedFollowId").with_child(XmlElement::new("doc").with_text("x"));
    assert!(is_configuration(xml().from_element::<MisusedFollowId>(&element)));
}

#[test]
fn borrowed_cell_cannot_be_written() {
    let cell = Rc::new(RefCell::new(Counter { value: 1 }));
    let _guard = cell.borrow_mut();
    assert!(is_configuration(xml().to_element(&cell)));
}

// -----------------------------------------------------------------------------
// Shared instances

#[derive(Classify, Default, Debug)]
struct Pair {
    a: Rc<RefCell<Counter>>,
    b: Rc<RefCell<Counter>>,
}

fn shared_pair() -> Pair {
    let counter = Rc::new(RefCell::new(Counter { value: 5 }));
    Pair {
        a: counter.clone(),
        b: counter,
    }
}

#[test]
fn shared_instances_are_written_once() {
    let element = xml().to_element(&shared_pair()).unwrap();
    assert_eq!(child(&element, "a").attribute("refid"), Some("a"));
    assert_eq!(child(&element, "b").attribute("ref"), Some("a"));
    assert!(child(&element, "b").children.is_empty());

    let pair: Pair = xml().from_element(&element).unwrap();
    assert!(Rc::ptr_eq(&pair.a, &pair.b));
    pair.a.borrow_mut().value = 6;
    assert_eq!(pair.b.borrow().value, 6);
}

#[test]
fn unshared_instances_carry_no_markers() {
    let pair = Pair {
        a: Rc::new(RefCell::new(Counter { value: 1 })),
        b: Rc::new(RefCell::new(Counter { value: 2 })),
    };
    let element = xml().to_element(&pair).unwrap();
    assert_eq!(child(&element, "a").attribute("refid"), None);
    assert_eq!(child(&element, "b").attribute("refid"), None);

    let pair: Pair = xml().from_element(&element).unwrap();
    assert!(!Rc::ptr_eq(&pair.a, &pair.b));
    assert_eq!(pair.b.borrow().value, 2);
}

#[test]
fn shared_plain_rc_keeps_identity() {
    let shared = Rc::new(String::from("same"));
    let list = vec![shared.clone(), shared, Rc::new(String::from("other"))];

    let element = xml().to_element(&list).unwrap();
    let list: Vec<Rc<String>> = xml().from_element(&element).unwrap();
    assert!(Rc::ptr_eq(&list[0], &list[1]));
    assert!(!Rc::ptr_eq(&list[0], &list[2]));
    assert_eq!(*list[2], "other");
}

#[test]
fn dangling_reference_is_bad_data() {
    let element = XmlElement::new("Pair")
        .with_child(XmlElement::new("a").with_child(XmlElement::new("value").with_text("1")))
        .with_child(XmlElement::new("b").with_attribute("ref", "zz"));

    let err = strict_xml().from_element::<Pair>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.b");

    let pair: Pair = xml().from_element(&element).unwrap();
    assert_eq!(pair.a.borrow().value, 1);
    assert_eq!(pair.b.borrow().value, 0);
}

#[derive(Classify, Default, Debug)]
#[classify(rename = "Pair")]
struct SwappedPair {
    b: Rc<RefCell<Counter>>,
    a: Rc<RefCell<Counter>>,
}

#[derive(Classify, Default)]
#[classify(rename = "Labels")]
struct LabelsV1 {
    head: Rc<String>,
    tail: Rc<String>,
}

#[derive(Classify, Default)]
#[classify(rename = "Labels")]
struct LabelsV2 {
    tail: Rc<String>,
    head: Rc<String>,
}

#[test]
fn references_may_precede_their_target() {
    // `b` holds the reference and is read before `a`.
    let element = xml().to_element(&shared_pair()).unwrap();
    for classifier in [xml(), strict_xml()] {
        let pair: SwappedPair = classifier.from_element(&element).unwrap();
        assert!(Rc::ptr_eq(&pair.a, &pair.b));
        assert_eq!(pair.a.borrow().value, 5);
    }

    let label = Rc::new(String::from("same"));
    let json = Classifier::new(JsonFormat::new());
    let bytes = json
        .to_bytes(&LabelsV1 {
            head: label.clone(),
            tail: label,
        })
        .unwrap();
    let labels: LabelsV2 = json.from_bytes(&bytes).unwrap();
    assert!(Rc::ptr_eq(&labels.head, &labels.tail));
    assert_eq!(*labels.tail, "same");
}

#[test]
fn disabled_references_duplicate_shared_values() {
    let classifier = xml().with_options(ClassifyOptions::default().with_references(false));
    let element = classifier.to_element(&shared_pair()).unwrap();
    assert_eq!(child(&element, "a").attribute("refid"), None);
    assert_eq!(child(&element, "b").attribute("ref"), None);

    let pair: Pair = classifier.from_element(&element).unwrap();
    assert!(!Rc::ptr_eq(&pair.a, &pair.b));
    assert_eq!(pair.b.borrow().value, 5);
}

// -----------------------------------------------------------------------------
// Cycles and parents

#[derive(Classify, Default)]
struct Node {
    name: String,
    next: Option<Rc<RefCell<Node>>>,
    #[classify(parent)]
    parent: Weak<RefCell<Node>>,
}

fn node(name: &str) -> Rc<RefCell<Node>> {
    Rc::new(RefCell::new(Node {
        name: String::from(name),
        ..Node::default()
    }))
}

fn ring() -> Rc<RefCell<Node>> {
    let first = node("first");
    let second = node("second");
    second.borrow_mut().next = Some(first.clone());
    first.borrow_mut().next = Some(second);
    first
}

fn unlink(node: &Rc<RefCell<Node>>) {
    node.borrow_mut().next = None;
}

#[test]
fn cycles_round_trip() {
    let first = ring();
    let element = xml().to_element(&first).unwrap();
    assert_eq!(element.name, "Node");
    assert_eq!(element.attribute("refid"), Some("a"));
    assert_eq!(child(child(&element, "next"), "next").attribute("ref"), Some("a"));

    let back: Rc<RefCell<Node>> = xml().from_element(&element).unwrap();
    let second = back.borrow().next.clone().unwrap();
    assert_eq!(second.borrow().name, "second");
    assert!(Rc::ptr_eq(second.borrow().next.as_ref().unwrap(), &back));

    // The nearest enclosing shared object is the parent.
    assert!(back.borrow().parent.upgrade().is_none());
    assert!(Rc::ptr_eq(&second.borrow().parent.upgrade().unwrap(), &back));

    unlink(&first);
    unlink(&back);
}

#[test]
fn cycles_need_references() {
    let first = ring();
    let classifier = xml().with_options(ClassifyOptions::default().with_references(false));
    let err = classifier.to_element(&first).unwrap_err();
    assert!(matches!(err, ClassifyError::UnsupportedCyclicReference { .. }));
    unlink(&first);
}

#[derive(Classify, Default)]
struct Tree {
    name: String,
    children: Vec<Rc<RefCell<Leaf>>>,
    inline: Vec<Leaf>,
}

#[derive(Classify, Default)]
struct Leaf {
    label: String,
    #[classify(parent)]
    owner: Option<Weak<RefCell<Tree>>>,
}

fn owner_of(leaf: &Leaf) -> Option<Rc<RefCell<Tree>>> {
    leaf.owner.as_ref().and_then(Weak::upgrade)
}

#[test]
fn parents_are_attached_while_reading() {
    let tree = Tree {
        name: String::from("root"),
        children: vec![Rc::new(RefCell::new(Leaf {
            label: String::from("shared"),
            owner: None,
        }))],
        inline: vec![Leaf {
            label: String::from("plain"),
            owner: None,
        }],
    };
    let element = xml().to_element(&Rc::new(RefCell::new(tree))).unwrap();
    assert!(element.child("owner").is_none());

    let tree: Rc<RefCell<Tree>> = xml().from_element(&element).unwrap();
    let borrowed = tree.borrow();
    let shared = borrowed.children[0].borrow();
    assert_eq!(shared.label, "shared");
    assert!(Rc::ptr_eq(&owner_of(&shared).unwrap(), &tree));
    assert!(Rc::ptr_eq(&owner_of(&borrowed.inline[0]).unwrap(), &tree));
}

#[derive(Classify, Default)]
struct Holder {
    leaf: Leaf,
}

#[test]
fn parent_of_another_type_is_not_attached() {
    let holder = Rc::new(RefCell::new(Holder {
        leaf: Leaf {
            label: String::from("n"),
            owner: None,
        },
    }));
    let element = xml().to_element(&holder).unwrap();

    let holder: Rc<RefCell<Holder>> = xml().from_element(&element).unwrap();
    assert_eq!(holder.borrow().leaf.label, "n");
    assert!(holder.borrow().leaf.owner.is_none());

    let leaf: Leaf = xml().from_element(child(&element, "leaf")).unwrap();
    assert!(leaf.owner.is_none());
}

// -----------------------------------------------------------------------------
// Satellites

#[derive(Classify, Default, Debug)]
struct Page {
    #[classify(captures_id)]
    id: String,
    body: String,
    #[classify(parent)]
    book: Option<Weak<RefCell<Book>>>,
}

#[derive(Classify, Default, Debug)]
struct Book {
    title: String,
    #[classify(follow_id)]
    first: Deferred<Page>,
    #[classify(follow_id)]
    later: Deferred<Page>,
    cached: Deferred<u32>,
}

fn page(body: &str) -> Page {
    Page {
        body: String::from(body),
        ..Page::default()
    }
}

fn book() -> Book {
    Book {
        title: String::from("Notes"),
        first: Deferred::new("p1", page("hello")),
        later: Deferred::from_fn("p2", || Ok(page("never loaded"))),
        cached: Deferred::new("c", 7),
    }
}

#[test]
fn new_handles_capture_their_id() {
    let book = book();
    assert_eq!(book.first.get().unwrap().id, "p1");
    assert!(!book.later.is_evaluated());
}

#[test]
fn satellites_are_written_and_loaded_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xml");
    xml().write_to_file(&Rc::new(RefCell::new(book())), &path).unwrap();

    assert!(dir.path().join("Page").join("p1.xml").is_file());
    assert!(!dir.path().join("Page").join("p2.xml").exists());

    let book: Rc<RefCell<Book>> = xml().read_from_file(&path).unwrap();
    let borrowed = book.borrow();
    assert_eq!(borrowed.title, "Notes");
    assert_eq!(borrowed.first.id(), "p1");
    assert!(!borrowed.first.is_evaluated());

    let first = borrowed.first.value().unwrap();
    assert_eq!(first.body, "hello");
    assert_eq!(first.id, "p1");
    assert!(Rc::ptr_eq(&first.book.as_ref().and_then(Weak::upgrade).unwrap(), &book));

    // Evaluated once, then cached.
    assert!(core::ptr::eq(first, borrowed.first.value().unwrap()));

    assert!(matches!(borrowed.later.value(), Err(ClassifyError::Io { .. })));
    assert!(is_configuration(borrowed.later.value()));

    assert!(borrowed.cached.is_evaluated());
    assert_eq!(*borrowed.cached.value().unwrap(), 7);
}

#[test]
fn markers_are_written_without_a_base_directory() {
    let element = xml().to_element(&book()).unwrap();
    assert_eq!(child(&element, "first").attribute("id"), Some("p1"));
    assert_eq!(child(&element, "later").attribute("id"), Some("p2"));
    assert_eq!(child(child(&element, "cached"), "value").text(), "7");

    let book: Book = xml().from_element(&element).unwrap();
    assert!(is_configuration(book.first.value()));
}

#[test]
fn satellite_ids_must_name_a_file() {
    let bad = Book {
        first: Deferred::new("../escape", Page::default()),
        ..Book::default()
    };
    assert!(matches!(xml().to_element(&bad), Err(ClassifyError::Data { .. })));

    let element = XmlElement::new("Book").with_child(XmlElement::new("first").with_attribute("id", "a/b"));
    let err = strict_xml().from_element::<Book>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.first");
}

// -----------------------------------------------------------------------------
// Polymorphism

#[derive(Classify, Default, Debug, PartialEq)]
struct Circle {
    radius: f64,
}

#[derive(Classify, Debug, PartialEq)]
enum Shape {
    Circle(Circle),
    Rect { w: f64, h: f64 },
    Segment(i32, i32),
    #[classify(rename = "Nothing")]
    Empty,
}

#[derive(Classify, Default, Debug, PartialEq)]
struct Drawing {
    shapes: Vec<Shape>,
    focus: Option<Shape>,
}

#[test]
fn variants_are_tagged() {
    let drawing = Drawing {
        shapes: vec![
            Shape::Circle(Circle { radius: 1.5 }),
            Shape::Rect { w: 2.0, h: 0.25 },
            Shape::Segment(-1, 4),
            Shape::Empty,
        ],
        focus: Some(Shape::Rect { w: 1.0, h: 1.0 }),
    };
    let element = xml().to_element(&drawing).unwrap();

    let tags: Vec<&str> = child(&element, "shapes")
        .children
        .iter()
        .map(|item| item.attribute("type").unwrap())
        .collect();
    assert_eq!(tags, ["Circle", "Rect", "Segment", "Nothing"]);
    assert_eq!(child(&child(&element, "shapes").children[2], "item2").text(), "4");

    assert_eq!(xml().from_element::<Drawing>(&element).unwrap(), drawing);
}

#[test]
fn unknown_variants_are_bad_data() {
    let element = XmlElement::new("Drawing").with_child(XmlElement::new("focus").with_attribute("type", "Hexagon"));

    let drawing: Drawing = xml().from_element(&element).unwrap();
    assert_eq!(drawing.focus, None);

    let err = strict_xml().from_element::<Drawing>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.focus");
}

#[derive(Classify, Debug, PartialEq)]
enum Wrapper {
    Shape(Shape),
    Maybe(Option<u32>),
}

#[derive(Classify, Default, Debug, PartialEq)]
struct Wrapped {
    items: Vec<Wrapper>,
    last: Option<Wrapper>,
}

fn wrapped() -> Wrapped {
    Wrapped {
        items: vec![
            Wrapper::Shape(Shape::Segment(2, 3)),
            Wrapper::Shape(Shape::Empty),
            Wrapper::Maybe(None),
            Wrapper::Maybe(Some(7)),
        ],
        last: Some(Wrapper::Maybe(None)),
    }
}

#[test]
fn newtype_variants_keep_their_payload() {
    let element = strict_xml().to_element(&wrapped()).unwrap();
    let first = &child(&element, "items").children[0];
    assert_eq!(first.attribute("type"), Some("Shape"));
    assert_eq!(child(first, "value").attribute("type"), Some("Segment"));
    assert_eq!(child(child(&element, "last"), "value").attribute("null"), Some("1"));
    assert_eq!(strict_xml().from_element::<Wrapped>(&element).unwrap(), wrapped());

    let json = Classifier::new(JsonFormat::new())
        .with_options(ClassifyOptions::default().with_strictness(Strictness::Strict));
    let bytes = json.to_bytes(&wrapped()).unwrap();
    assert_eq!(json.from_bytes::<Wrapped>(&bytes).unwrap(), wrapped());
}

#[test]
fn newtype_variant_without_payload_is_bad_data() {
    let element = XmlElement::new("Wrapped").with_child(XmlElement::new("last").with_attribute("type", "Maybe"));

    let err = strict_xml().from_element::<Wrapped>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.last");

    let lenient: Wrapped = xml().from_element(&element).unwrap();
    assert_eq!(lenient.last, None);
}

// -----------------------------------------------------------------------------
// Dictionaries

#[derive(Classify, Default, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Color {
    #[default]
    Red,
    #[classify(rename = "green")]
    Green,
}

#[derive(Classify, Default, Debug, PartialEq)]
struct Palette {
    by_name: HashMap<String, u32>,
    by_color: BTreeMap<Color, String>,
    optional: BTreeMap<i32, Option<String>>,
    required: BTreeMap<i32, String>,
    accent: Color,
}

fn palette() -> Palette {
    Palette {
        by_name: HashMap::from([(String::from("zeta"), 26), (String::from("alpha"), 1)]),
        by_color: BTreeMap::from([(Color::Red, String::from("#f00")), (Color::Green, String::from("#0f0"))]),
        optional: BTreeMap::from([(1, None), (2, Some(String::from("x")))]),
        required: BTreeMap::from([(3, String::from("three"))]),
        accent: Color::Green,
    }
}

fn keys(element: &XmlElement) -> Vec<&str> {
    element.children.iter().map(|item| item.attribute("key").unwrap()).collect()
}

#[test]
fn dictionaries_round_trip() {
    let element = xml().to_element(&palette()).unwrap();
    assert_eq!(keys(child(&element, "by_name")), ["alpha", "zeta"]);
    assert_eq!(keys(child(&element, "by_color")), ["Red", "green"]);
    assert_eq!(child(&element, "accent").text(), "green");

    assert_eq!(xml().from_element::<Palette>(&element).unwrap(), palette());
}

#[test]
fn null_entries_are_dropped_unless_nullable() {
    let mut element = xml().to_element(&palette()).unwrap();
    child_mut(&mut element, "required")
        .children
        .push(XmlElement::new("item").with_attribute("key", "9").with_attribute("null", "1"));

    let read: Palette = strict_xml().from_element(&element).unwrap();
    assert_eq!(read.required.len(), 1);
    assert_eq!(read.optional.get(&1), Some(&None));
}

#[test]
fn bad_keys_are_reported_with_the_key() {
    let element = XmlElement::new("Palette").with_child(
        XmlElement::new("by_color").with_child(XmlElement::new("item").with_attribute("key", "purple").with_text("x")),
    );
    let err = strict_xml().from_element::<Palette>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.by_color[\"purple\"]");
}

// -----------------------------------------------------------------------------
// Tuples, pairs and arrays

#[derive(Classify, Default, Debug, PartialEq)]
struct Mixed {
    pair: (u8, String),
    entry: KeyValuePair<String, i64>,
    rgb: [u8; 3],
}

fn mixed() -> Mixed {
    Mixed {
        pair: (7, String::from("seven")),
        entry: KeyValuePair::new(String::from("k"), -3),
        rgb: [1, 2, 3],
    }
}

#[test]
fn fixed_shapes_round_trip() {
    let element = xml().to_element(&mixed()).unwrap();
    assert_eq!(child(child(&element, "pair"), "item2").text(), "seven");
    assert_eq!(child(child(&element, "entry"), "value").text(), "-3");

    assert_eq!(xml().from_element::<Mixed>(&element).unwrap(), mixed());
}

#[test]
fn incomplete_fixed_shapes_are_bad_data() {
    let mut element = xml().to_element(&mixed()).unwrap();
    child_mut(&mut element, "entry").children.retain(|c| c.name == "key");
    let err = strict_xml().from_element::<Mixed>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.entry");

    let mut element = xml().to_element(&mixed()).unwrap();
    child_mut(&mut element, "rgb").children.pop();
    let err = strict_xml().from_element::<Mixed>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.rgb");

    let mut element = xml().to_element(&mixed()).unwrap();
    child_mut(&mut element, "pair").children.retain(|c| c.name == "item1");
    let err = strict_xml().from_element::<Mixed>(&element).unwrap_err();
    assert_eq!(data_path(err), "root.pair");

    let lenient: Mixed = xml().from_element(&element).unwrap();
    assert_eq!(lenient.pair, (0, String::new()));
    assert_eq!(lenient.rgb, [1, 2, 3]);
}

// -----------------------------------------------------------------------------
// Self values

#[derive(Classify, Default, Debug, PartialEq)]
struct Annotated {
    note: String,
    extra: XmlElement,
}

#[test]
fn raw_elements_are_embedded() {
    let annotated = Annotated {
        note: String::from("n"),
        extra: XmlElement::new("custom")
            .with_attribute("kind", "free")
            .with_child(XmlElement::new("deep").with_text("1")),
    };
    let element = xml().to_element(&annotated).unwrap();
    assert_eq!(child(&element, "extra").children[0].name, "custom");
    assert_eq!(xml().from_element::<Annotated>(&element).unwrap(), annotated);
}

#[derive(Classify, Default)]
struct Quoted {
    pair: Pair,
    quote: XmlElement,
}

#[test]
fn raw_elements_keep_their_markers() {
    let quoted = Quoted {
        pair: Pair {
            a: Rc::new(RefCell::new(Counter { value: 1 })),
            b: Rc::new(RefCell::new(Counter { value: 2 })),
        },
        quote: XmlElement::new("note").with_attribute("refid", "#0").with_text("as is"),
    };
    let element = xml().to_element(&quoted).unwrap();
    assert_eq!(child(child(&element, "pair"), "a").attribute("refid"), None);

    let read: Quoted = xml().from_element(&element).unwrap();
    assert_eq!(read.quote, quoted.quote);
    assert_eq!(read.pair.b.borrow().value, 2);
}

#[test]
fn raw_elements_belong_to_their_format() {
    let result = Classifier::new(JsonFormat::new()).to_element(&Annotated::default());
    assert!(is_configuration(result));
}

#[derive(Classify, Default, Debug, PartialEq)]
struct JsonNote {
    raw: serde_json::Value,
}

#[test]
fn raw_json_is_embedded() {
    let note = JsonNote {
        raw: serde_json::json!({ "k": [1, 2], "nested": { "x": null } }),
    };
    let json = Classifier::new(JsonFormat::new());
    let element = json.to_element(&note).unwrap();
    assert_eq!(element["raw"][":raw"]["k"][1], 2);
    assert_eq!(json.from_element::<JsonNote>(&element).unwrap(), note);
}

// -----------------------------------------------------------------------------
// JSON

#[test]
fn json_round_trips() {
    let json = Classifier::new(JsonFormat::new());

    let bytes = json.to_bytes(&bob()).unwrap();
    assert_eq!(json.from_bytes::<Person>(&bytes).unwrap(), bob());

    let bytes = json.to_bytes(&shared_pair()).unwrap();
    let text = core::str::from_utf8(&bytes).unwrap();
    assert!(text.contains("\":refid\""));
    let pair: Pair = json.from_bytes(&bytes).unwrap();
    assert!(Rc::ptr_eq(&pair.a, &pair.b));

    let bytes = json.to_bytes(&palette()).unwrap();
    assert_eq!(json.from_bytes::<Palette>(&bytes).unwrap(), palette());

    let drawing = Drawing {
        shapes: vec![Shape::Circle(Circle { radius: 2.0 }), Shape::Empty],
        focus: None,
    };
    let bytes = json.to_bytes(&drawing).unwrap();
    assert_eq!(json.from_bytes::<Drawing>(&bytes).unwrap(), drawing);
}

#[test]
fn json_satellites_use_their_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    let json = Classifier::new(JsonFormat::new());
    json.write_to_file(&book(), &path).unwrap();
    assert!(dir.path().join("Page").join("p1.json").is_file());

    let book: Book = json.read_from_file(&path).unwrap();
    assert_eq!(book.first.value().unwrap().body, "hello");
}

// -----------------------------------------------------------------------------
// Depth limit

fn chain(length: usize) -> Person {
    (0..length).fold(Person::default(), |inner, _| Person {
        self_ref: Some(Box::new(inner)),
        ..Person::default()
    })
}

#[test]
fn depth_limit_applies_both_ways() {
    let limited = xml().with_options(ClassifyOptions::default().with_max_depth(4));
    let deep = chain(10);

    assert!(matches!(
        limited.to_element(&deep),
        Err(ClassifyError::DepthExceeded { limit: 4, .. })
    ));

    let element = xml().to_element(&deep).unwrap();
    assert!(matches!(
        limited.from_element::<Person>(&element),
        Err(ClassifyError::DepthExceeded { limit: 4, .. })
    ));
    assert_eq!(xml().from_element::<Person>(&element).unwrap(), deep);

    assert_eq!(limited.from_element::<Person>(&limited.to_element(&chain(1)).unwrap()).unwrap(), chain(1));
}

// -----------------------------------------------------------------------------
// Chrono

#[cfg(feature = "chrono")]
#[test]
fn timestamps_round_trip() {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    #[derive(Classify, Default, Debug, PartialEq)]
    struct Entry {
        at: DateTime<Utc>,
        day: NaiveDate,
    }

    let entry = Entry {
        at: Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 5).unwrap(),
        day: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
    };
    let element = xml().to_element(&entry).unwrap();
    assert_eq!(xml().from_element::<Entry>(&element).unwrap(), entry);
}
