use proc_macro2::TokenStream;
use syn::{
	parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Error, GenericParam, Generics,
	Lit, Meta, NestedMeta,
};

mod enums;
use enums::derive_enum;
mod structs;
use structs::derive_struct;

/// Derive `Shape`, `Reflect` and `Persist` for a struct.
///
/// On an enum whose variants have no fields, derives only `Persist`,
/// storing the variant's discriminant as an `i64`.
///
/// Field attributes:
/// * `#[ser_base]`: field is a base. Its fields are flattened ahead of this type's own.
/// * `#[ser_skip]`: field is not serialized, and left untouched on load.
///
/// Type attributes:
/// * `#[ser_limits(max_fields = 8, max_identifier_len = 32)]`: override shape limits.
#[proc_macro_derive(Reflect, attributes(ser_base, ser_skip, ser_limits))]
pub fn reflect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	reflect_impl(input)
		.unwrap_or_else(Error::into_compile_error)
		.into()
}

fn reflect_impl(input: DeriveInput) -> Result<TokenStream, Error> {
	let limits = get_limits(&input.attrs)?;
	let generics_for_impl = get_generics(&input.generics)?;

	match input.data {
		Data::Struct(data) => Ok(derive_struct(
			data,
			input.ident,
			limits,
			input.generics,
			generics_for_impl,
		)),
		Data::Enum(data) => {
			if let Some(attr) = input.attrs.iter().find(|attr| attr.path.is_ident("ser_limits")) {
				return Err(Error::new_spanned(attr, "`#[ser_limits]` has no effect on enums"));
			}
			derive_enum(data, input.ident, input.generics, generics_for_impl)
		}
		Data::Union(data) => Err(Error::new(
			data.union_token.span,
			"Deriving `Reflect` on unions is not supported",
		)),
	}
}

/// Amend generics to bound type params by `Persist + 'static`.
/// `Reflect` requires `Any`, so lifetime params are rejected.
fn get_generics(generics: &Generics) -> Result<Generics, Error> {
	let mut generics_for_impl = generics.clone();
	for param in generics_for_impl.params.iter_mut() {
		match param {
			GenericParam::Type(param) => {
				param.bounds.push(parse_quote!(::ser_auto::Persist));
				param.bounds.push(parse_quote!('static));
			}
			GenericParam::Lifetime(param) => {
				return Err(Error::new_spanned(
					param,
					"`Reflect` cannot be derived for types with lifetime parameters",
				))
			}
			GenericParam::Const(_) => {}
		}
	}
	Ok(generics_for_impl)
}

/// Limits from `#[ser_limits(...)]` attribute. `None` fields use the library defaults.
#[derive(Default)]
pub(crate) struct Limits {
	pub max_fields: Option<Lit>,
	pub max_identifier_len: Option<Lit>,
}

fn get_limits(attrs: &[Attribute]) -> Result<Option<Limits>, Error> {
	let mut found: Option<Limits> = None;

	for attr in attrs {
		if !attr.path.is_ident("ser_limits") {
			continue;
		}
		if found.is_some() {
			return Err(Error::new_spanned(
				attr,
				"Can only have one `#[ser_limits]` attribute",
			));
		}

		let nested = match attr.parse_meta()? {
			Meta::List(list) => list.nested,
			meta => {
				return Err(Error::new_spanned(
					meta,
					"`#[ser_limits]` needs arguments e.g. `#[ser_limits(max_fields = 8)]`",
				))
			}
		};

		let mut limits = Limits::default();
		for item in nested {
			let pair = match item {
				NestedMeta::Meta(Meta::NameValue(pair)) => pair,
				item => {
					return Err(Error::new_spanned(
						item,
						"Expected `max_fields = N` or `max_identifier_len = N`",
					))
				}
			};
			if !matches!(pair.lit, Lit::Int(_)) {
				return Err(Error::new_spanned(pair.lit, "Limit must be an integer"));
			}
			if pair.path.is_ident("max_fields") {
				limits.max_fields = Some(pair.lit);
			} else if pair.path.is_ident("max_identifier_len") {
				limits.max_identifier_len = Some(pair.lit);
			} else {
				return Err(Error::new_spanned(
					pair.path,
					"Unknown limit, expected `max_fields` or `max_identifier_len`",
				));
			}
		}
		found = Some(limits);
	}

	Ok(found)
}
