use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{
	ext::IdentExt, spanned::Spanned, DataStruct, Field, Generics, Ident, Index, LitStr, Type,
};

use crate::Limits;

/// A field exposed to reflection, either as a base or an ordinary field.
struct ExposedField {
	/// Expression to access field on `self` e.g. `foo` or `0`
	accessor: TokenStream,
	/// Name written to archives
	name: String,
	ty: Type,
	span: proc_macro2::Span,
}

pub fn derive_struct(
	data: DataStruct,
	ident: Ident,
	limits: Option<Limits>,
	generics: Generics,
	generics_for_impl: Generics,
) -> TokenStream {
	let mut bases = vec![];
	let mut fields = vec![];

	for (index, field) in data.fields.iter().enumerate() {
		if has_attr(field, "ser_skip") {
			continue;
		}
		let exposed = get_exposed_field(field, index);
		if has_attr(field, "ser_base") {
			bases.push(exposed);
		} else {
			fields.push(exposed);
		}
	}

	let (impl_generics, _, _) = generics_for_impl.split_for_impl();
	let (_, type_generics, where_clause) = generics.split_for_impl();

	let field_names = fields
		.iter()
		.map(|field| LitStr::new(&field.name, field.span));

	let limits_const = limits.map(|limits| {
		let max_fields = match limits.max_fields {
			Some(lit) => quote! {#lit},
			None => quote! {::ser_auto::MAX_FIELDS},
		};
		let max_identifier_len = match limits.max_identifier_len {
			Some(lit) => quote! {#lit},
			None => quote! {::ser_auto::MAX_IDENTIFIER_LEN},
		};
		quote! {
			const LIMITS: ::ser_auto::Limits = ::ser_auto::Limits {
				max_fields: #max_fields,
				max_identifier_len: #max_identifier_len,
			};
		}
	});

	let base_types = bases.iter().map(|base| {
		let ty = &base.ty;
		quote_spanned! {base.span=> ::ser_auto::BaseType::of::<#ty>()}
	});

	let field_arms = get_arms(&fields, quote! {&}, quote! {::ser_auto::Persist});
	let field_mut_arms = get_arms(&fields, quote! {&mut}, quote! {::ser_auto::Persist});
	let base_arms = get_arms(&bases, quote! {&}, quote! {::ser_auto::Reflect});
	let base_mut_arms = get_arms(&bases, quote! {&mut}, quote! {::ser_auto::Reflect});

	quote! {
		#[automatically_derived]
		impl #impl_generics ::ser_auto::Shape for #ident #type_generics #where_clause {
			const FIELD_NAMES: &'static [&'static str] = &[#(#field_names),*];
			#limits_const

			fn base_types() -> ::std::vec::Vec<::ser_auto::BaseType> {
				::std::vec![#(#base_types),*]
			}
		}

		#[automatically_derived]
		impl #impl_generics ::ser_auto::Reflect for #ident #type_generics #where_clause {
			#[inline]
			fn descriptor(&self) -> &'static ::ser_auto::TypeDescriptor {
				::ser_auto::descriptor_for::<Self>()
			}

			fn field(&self, ordinal: usize) -> &dyn ::ser_auto::Persist {
				match ordinal {
					#(#field_arms)*
					_ => ::ser_auto::out_of_range(::std::any::type_name::<Self>(), "field", ordinal),
				}
			}

			fn field_mut(&mut self, ordinal: usize) -> &mut dyn ::ser_auto::Persist {
				match ordinal {
					#(#field_mut_arms)*
					_ => ::ser_auto::out_of_range(::std::any::type_name::<Self>(), "field", ordinal),
				}
			}

			fn base(&self, index: usize) -> &dyn ::ser_auto::Reflect {
				match index {
					#(#base_arms)*
					_ => ::ser_auto::out_of_range(::std::any::type_name::<Self>(), "base", index),
				}
			}

			fn base_mut(&mut self, index: usize) -> &mut dyn ::ser_auto::Reflect {
				match index {
					#(#base_mut_arms)*
					_ => ::ser_auto::out_of_range(::std::any::type_name::<Self>(), "base", index),
				}
			}
		}

		#[automatically_derived]
		impl #impl_generics ::ser_auto::Persist for #ident #type_generics #where_clause {
			#[inline]
			fn save(
				&self,
				ar: &mut dyn ::ser_auto::OutputArchive,
				name: ::std::option::Option<&str>,
			) -> ::ser_auto::Result<()> {
				::ser_auto::save_object(ar, name, self)
			}

			#[inline]
			fn load(&mut self, ar: &mut dyn ::ser_auto::InputArchive) -> ::ser_auto::Result<()> {
				::ser_auto::load_object(ar, self)
			}
		}
	}
}

fn get_exposed_field(field: &Field, index: usize) -> ExposedField {
	let (accessor, name) = match &field.ident {
		Some(ident) => (quote! {#ident}, ident.unraw().to_string()),
		None => {
			let index_token = Index::from(index);
			(quote! {#index_token}, format!("value{index}"))
		}
	};
	ExposedField {
		accessor,
		name,
		ty: field.ty.clone(),
		span: field.span(),
	}
}

/// Match arms mapping ordinal to a reference to each field, as `&dyn Trait`.
fn get_arms(fields: &[ExposedField], reference: TokenStream, target: TokenStream) -> Vec<TokenStream> {
	fields
		.iter()
		.enumerate()
		.map(|(ordinal, field)| {
			let accessor = &field.accessor;
			quote_spanned! {field.span=>
				#ordinal => #reference self.#accessor as #reference dyn #target,
			}
		})
		.collect()
}

fn has_attr(field: &Field, name: &str) -> bool {
	field.attrs.iter().any(|attr| attr.path.is_ident(name))
}
