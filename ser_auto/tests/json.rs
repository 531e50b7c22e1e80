use std::fmt::Debug;

use ser_auto::{from_json, load_json, to_json, Persist, Reflect};

mod common;
use common::{generate_sample_data, tests};

fn round_trip<T: Persist + Default + Debug>(input: &T) -> T {
	let json = to_json(input).unwrap();
	let output: T = load_json(&json).unwrap();

	let mut reused = T::default();
	from_json(&mut reused, &json).unwrap();
	assert_eq!(format!("{reused:?}"), format!("{output:?}"));

	output
}

tests!(round_trip);
