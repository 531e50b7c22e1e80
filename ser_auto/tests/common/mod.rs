mod sample_data;
pub use sample_data::generate_data as generate_sample_data;

macro_rules! tests {
	($round_trip:ident) => {
		#[test]
		fn primitives() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				u8: u8,
				u16: u16,
				u32: u32,
				u64: u64,
				i8: i8,
				i16: i16,
				i32: i32,
				i64: i64,
				usize: usize,
				isize: isize,
				f32: f32,
				f64: f64,
				bool: bool,
				char: char,
				unit: (),
			}

			let input = Foo {
				u8: 0x01,
				u16: 0x0203,
				u32: 0x04050607,
				u64: u64::MAX,
				i8: i8::MIN,
				i16: -0x0203,
				i32: 0x04050607,
				i64: i64::MIN,
				usize: usize::MAX,
				isize: isize::MIN,
				f32: f32::MAX,
				f64: -f64::MIN_POSITIVE,
				bool: true,
				char: 'c',
				unit: (),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn non_zero_numbers() {
			use std::num;

			#[derive(Reflect, Debug, PartialEq)]
			#[allow(non_snake_case)]
			struct Foo {
				NonZeroU8: num::NonZeroU8,
				NonZeroU64: num::NonZeroU64,
				NonZeroUsize: num::NonZeroUsize,
				NonZeroI16: num::NonZeroI16,
				NonZeroI32: num::NonZeroI32,
				NonZeroIsize: num::NonZeroIsize,
			}

			impl Default for Foo {
				fn default() -> Self {
					Self {
						NonZeroU8: num::NonZeroU8::new(1).unwrap(),
						NonZeroU64: num::NonZeroU64::new(1).unwrap(),
						NonZeroUsize: num::NonZeroUsize::new(1).unwrap(),
						NonZeroI16: num::NonZeroI16::new(1).unwrap(),
						NonZeroI32: num::NonZeroI32::new(1).unwrap(),
						NonZeroIsize: num::NonZeroIsize::new(1).unwrap(),
					}
				}
			}

			let input = Foo {
				NonZeroU8: num::NonZeroU8::new(0x01).unwrap(),
				NonZeroU64: num::NonZeroU64::new(0x08090a0b0c0d0e0f).unwrap(),
				NonZeroUsize: num::NonZeroUsize::new(usize::MAX).unwrap(),
				NonZeroI16: num::NonZeroI16::new(-0x0203).unwrap(),
				NonZeroI32: num::NonZeroI32::new(0x04050607).unwrap(),
				NonZeroIsize: num::NonZeroIsize::new(isize::MAX / 2).unwrap(),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn fields_in_order() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				foo: i32,
				bar: String,
			}

			let input = Foo {
				foo: 1,
				bar: "PLEH!".to_string(),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn base_fields() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Base {
				foo: i32,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Derived {
				#[ser_base]
				base: Base,
				bar: i32,
			}

			let input = Derived {
				base: Base { foo: 22 },
				bar: 42,
			};
			let output = $round_trip(&input);
			assert_eq!(output.base.foo, 22);
			assert_eq!(output.bar, 42);
		}

		#[test]
		fn base_and_derived_fields_with_same_name() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Base {
				value: i32,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Derived {
				#[ser_base]
				base: Base,
				value: i32,
			}

			let input = Derived {
				base: Base { value: 1 },
				value: 2,
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn multi_level_and_multiple_bases() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct A {
				a: u8,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct B {
				#[ser_base]
				a: A,
				b: String,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Other {
				other: Vec<u16>,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct C {
				c: bool,
				#[ser_base]
				b: B,
				#[ser_base]
				other: Other,
			}

			let input = C {
				c: true,
				b: B {
					a: A { a: 7 },
					b: "bee".to_string(),
				},
				other: Other {
					other: vec![1, 2, 3],
				},
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn nested_structs() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Inner {
				x: i64,
				label: String,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Outer {
				first: Inner,
				second: Inner,
				boxed: Box<Inner>,
			}

			let input = Outer {
				first: Inner {
					x: -1,
					label: "one".to_string(),
				},
				second: Inner {
					x: 2,
					label: "two".to_string(),
				},
				boxed: Box::new(Inner {
					x: 3,
					label: "three".to_string(),
				}),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn vecs() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Bar {
				small: u8,
				big: u32,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				empty: Vec<u8>,
				numbers: Vec<u32>,
				strings: Vec<String>,
				nested: Vec<Vec<u8>>,
				structs: Vec<Bar>,
				boxes: Vec<Box<u16>>,
			}

			let input = Foo {
				empty: vec![],
				numbers: vec![1, 2, 3, u32::MAX],
				strings: vec!["a".to_string(), String::new(), "c".to_string()],
				nested: vec![vec![], vec![1], vec![2, 3]],
				structs: vec![Bar { small: 1, big: 2 }, Bar { small: 3, big: 4 }],
				boxes: vec![Box::new(5), Box::new(6)],
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn strings() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				empty: String,
				spaces: String,
				markup: String,
				whitespace: String,
				unicode: String,
				control: String,
				chars: Vec<char>,
			}

			let input = Foo {
				empty: String::new(),
				spaces: "  padded  ".to_string(),
				markup: r#"<a href="x">&amp;</a> 'q' ]]>"#.to_string(),
				whitespace: "line 1\nline 2\r\n\ttabbed".to_string(),
				unicode: "ünïcödé 🦀 日本語".to_string(),
				control: "\u{7f}\u{85}\u{9f}\r".to_string(),
				chars: vec!['<', '&', ' ', '\n', '🦀'],
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn fieldless_enums() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			enum Color {
				#[default]
				Red,
				Green = 10,
				Blue = -3,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				color: Color,
				palette: Vec<Color>,
			}

			let input = Foo {
				color: Color::Blue,
				palette: vec![Color::Green, Color::Red, Color::Blue],
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn deep_nesting() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Node {
				value: u32,
				next: Option<Box<Node>>,
			}

			let mut input = Node::default();
			for value in 1..=100 {
				input = Node {
					value,
					next: Some(Box::new(input)),
				};
			}
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn special_floats() {
			#[derive(Reflect, Debug, Default)]
			struct Foo {
				nan: f64,
				inf: f64,
				neg_inf: f32,
				neg_zero: f64,
				tiny: f32,
				third: f64,
			}

			let input = Foo {
				nan: f64::NAN,
				inf: f64::INFINITY,
				neg_inf: f32::NEG_INFINITY,
				neg_zero: -0.0,
				tiny: f32::MIN_POSITIVE,
				third: 1.0 / 3.0,
			};
			let output = $round_trip(&input);
			assert!(output.nan.is_nan());
			assert_eq!(output.inf, f64::INFINITY);
			assert_eq!(output.neg_inf, f32::NEG_INFINITY);
			assert!(output.neg_zero == 0.0 && output.neg_zero.is_sign_negative());
			assert_eq!(output.tiny, f32::MIN_POSITIVE);
			assert_eq!(output.third, 1.0 / 3.0);
		}

		#[test]
		fn options() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Bar {
				small: u8,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				none: Option<u32>,
				some: Option<u32>,
				some_struct: Option<Bar>,
				boxed: Option<Box<Bar>>,
				vec: Option<Vec<String>>,
				nested: Option<Option<i8>>,
			}

			let input = Foo {
				none: None,
				some: Some(0x11),
				some_struct: Some(Bar { small: 0x12 }),
				boxed: Some(Box::new(Bar { small: 0x13 })),
				vec: Some(vec!["def".to_string()]),
				nested: Some(None),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn arrays_and_tuples() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				empty: [u8; 0],
				single: [u8; 1],
				triple: [u16; 3],
				strings: [String; 2],
				pair: (u8, String),
				quad: (u8, i16, bool, char),
			}

			let input = Foo {
				empty: [],
				single: [0x01],
				triple: [0x0203, 0x0405, 0x0607],
				strings: ["x".to_string(), "y".to_string()],
				pair: (8, "eight".to_string()),
				quad: (1, -2, true, 'q'),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn tuple_and_unit_structs() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Pair(u32, String);

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Unit;

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Empty {}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				pair: Pair,
				unit: Unit,
				empty: Empty,
				after: u8,
			}

			let input = Foo {
				pair: Pair(1, "one".to_string()),
				unit: Unit,
				empty: Empty {},
				after: 0xff,
			};
			assert_eq!($round_trip(&input), input);
			assert_eq!($round_trip(&Unit), Unit);
		}

		#[test]
		fn maps() {
			use std::collections::BTreeMap;

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				empty: BTreeMap<u8, u8>,
				counts: BTreeMap<String, u32>,
				lists: BTreeMap<u8, Vec<String>>,
			}

			let input = Foo {
				empty: BTreeMap::new(),
				counts: [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect(),
				lists: [(1, vec!["x".to_string()]), (2, vec![])].into_iter().collect(),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn skipped_fields() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				kept: u32,
				#[ser_skip]
				cache: Vec<u32>,
				#[ser_skip]
				scratch: String,
				also_kept: String,
			}

			let input = Foo {
				kept: 1,
				cache: vec![1, 2, 3],
				scratch: "temp".to_string(),
				also_kept: "yes".to_string(),
			};
			let output = $round_trip(&input);
			assert_eq!(output.kept, 1);
			assert_eq!(output.also_kept, "yes");
			assert!(output.cache.is_empty());
			assert!(output.scratch.is_empty());
		}

		#[test]
		fn raw_identifiers_and_generics() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Wrapper<T> {
				r#type: u8,
				inner: T,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Bar {
				bar: String,
			}

			let input = Wrapper {
				r#type: 3,
				inner: Wrapper {
					r#type: 4,
					inner: Bar {
						bar: "generic".to_string(),
					},
				},
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn custom_limits() {
			#[derive(Reflect, Debug, Default, PartialEq)]
			#[ser_limits(max_fields = 3, max_identifier_len = 8)]
			struct Small {
				one: u8,
				two: u8,
			}

			let input = Small { one: 1, two: 2 };
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn shared_rc() {
			use std::{cell::RefCell, rc::Rc};

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Node {
				value: u32,
				name: String,
			}

			#[derive(Reflect, Debug, Default)]
			struct Graph {
				first: Rc<RefCell<Node>>,
				second: Rc<RefCell<Node>>,
				other: Rc<RefCell<Node>>,
				all: Vec<Rc<RefCell<Node>>>,
			}

			let node = Rc::new(RefCell::new(Node {
				value: 1,
				name: "shared".to_string(),
			}));
			let other = Rc::new(RefCell::new(Node {
				value: 2,
				name: "other".to_string(),
			}));
			let input = Graph {
				first: node.clone(),
				second: node.clone(),
				other: other.clone(),
				all: vec![other, node],
			};

			let output = $round_trip(&input);
			assert!(Rc::ptr_eq(&output.first, &output.second));
			assert!(Rc::ptr_eq(&output.first, &output.all[1]));
			assert!(Rc::ptr_eq(&output.other, &output.all[0]));
			assert!(!Rc::ptr_eq(&output.first, &output.other));
			assert_eq!(output.first.borrow().name, "shared");
			assert_eq!(output.other.borrow().value, 2);

			// Mutation through one handle is visible through the other
			output.first.borrow_mut().value = 99;
			assert_eq!(output.second.borrow().value, 99);
			assert_eq!(Rc::strong_count(&output.first), 3);
		}

		#[test]
		fn shared_arc_and_nested_shared() {
			use std::{rc::Rc, sync::Arc};

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Inner {
				text: Arc<String>,
			}

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				texts: Vec<Arc<String>>,
				inners: Vec<Rc<Inner>>,
			}

			let text = Arc::new("hello".to_string());
			let inner = Rc::new(Inner { text: text.clone() });
			let input = Foo {
				texts: vec![text.clone(), Arc::new("distinct".to_string()), text],
				inners: vec![inner.clone(), inner],
			};

			let output = $round_trip(&input);
			assert_eq!(output, input);
			assert!(Arc::ptr_eq(&output.texts[0], &output.texts[2]));
			assert!(!Arc::ptr_eq(&output.texts[0], &output.texts[1]));
			assert!(Rc::ptr_eq(&output.inners[0], &output.inners[1]));
			assert!(Arc::ptr_eq(&output.texts[0], &output.inners[0].text));
		}

		#[test]
		fn big_integers() {
			use num_bigint::{BigInt, BigUint};

			#[derive(Reflect, Debug, Default, PartialEq)]
			struct Foo {
				unsigned: BigUint,
				signed: BigInt,
			}

			let input = Foo {
				unsigned: "123456789012345678901234567890".parse().unwrap(),
				signed: "-98765432109876543210987654321".parse().unwrap(),
			};
			assert_eq!($round_trip(&input), input);
		}

		#[test]
		fn sample_data() {
			use std::rc::Rc;

			let input = generate_sample_data();
			let output = $round_trip(&input);
			assert_eq!(output, input);

			// Teams are shared between world and players
			for player in &output.players {
				assert!(output.teams.iter().any(|team| Rc::ptr_eq(team, &player.team)));
			}
			assert!(Rc::strong_count(&output.teams[0]) > 1);
		}
	};
}

pub(crate) use tests;
