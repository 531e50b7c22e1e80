use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{spanned::Spanned, DataEnum, Error, Fields, Generics, Ident};

/// Fieldless enums are stored as their discriminant, as an `i64`.
pub fn derive_enum(
	data: DataEnum,
	ident: Ident,
	generics: Generics,
	generics_for_impl: Generics,
) -> Result<TokenStream, Error> {
	let mut variants = vec![];
	for variant in data.variants {
		if !matches!(variant.fields, Fields::Unit) {
			return Err(Error::new(
				variant.fields.span(),
				"Deriving `Reflect` is only supported on enums without fields",
			));
		}
		variants.push(variant.ident);
	}

	let save_arms = variants.iter().map(|variant| {
		quote_spanned! {variant.span()=>
			Self::#variant => Self::#variant as i64,
		}
	});

	let load_stmts = variants.iter().map(|variant| {
		quote_spanned! {variant.span()=>
			if discriminant == Self::#variant as i64 {
				*self = Self::#variant;
				return ::std::result::Result::Ok(());
			}
		}
	});

	let (impl_generics, _, _) = generics_for_impl.split_for_impl();
	let (_, type_generics, where_clause) = generics.split_for_impl();

	Ok(quote! {
		#[automatically_derived]
		impl #impl_generics ::ser_auto::Persist for #ident #type_generics #where_clause {
			// Enum with no variants can't be saved at all
			#[allow(unreachable_code)]
			fn save(
				&self,
				ar: &mut dyn ::ser_auto::OutputArchive,
				name: ::std::option::Option<&str>,
			) -> ::ser_auto::Result<()> {
				let discriminant: i64 = match *self {
					#(#save_arms)*
				};
				::ser_auto::Persist::save(&discriminant, ar, name)
			}

			fn load(&mut self, ar: &mut dyn ::ser_auto::InputArchive) -> ::ser_auto::Result<()> {
				let mut discriminant: i64 = 0;
				::ser_auto::Persist::load(&mut discriminant, ar)?;
				#(#load_stmts)*
				::std::result::Result::Err(::ser_auto::Error::InvalidValue(::std::format!(
					"{} is not a discriminant of `{}`",
					discriminant,
					::std::any::type_name::<Self>(),
				)))
			}
		}
	})
}
