//! Describe derive macro implementation

use heck::ToKebabCase;
use heck::ToLowerCamelCase;
use heck::ToShoutySnakeCase;
use heck::ToSnakeCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro2::TokenTree;
use quote::ToTokens;
use quote::quote;
use syn::Data;
use syn::DeriveInput;
use syn::Fields;
use syn::GenericArgument;
use syn::GenericParam;
use syn::Ident;
use syn::LitStr;
use syn::PathArguments;
use syn::Type;
use syn::TypePath;
use syn::ext::IdentExt;
use syn::parse_macro_input;
use syn::parse_quote;

/// Implementation of the Describe derive macro
pub fn derive_describe_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let rename = RenameRule::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let name = ident.to_string();

    let mut params = Vec::new();
    for param in &input.generics.params {
        match param {
            GenericParam::Type(type_param) => params.push(type_param.ident.clone()),
            GenericParam::Lifetime(_) => {}
            GenericParam::Const(const_param) => {
                return Err(syn::Error::new_spanned(
                    const_param,
                    "Describe does not support const generic parameters",
                ));
            }
        }
    }

    let (definition, registrations) = match &input.data {
        Data::Struct(data) => {
            let fields = match &data.fields {
                Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
                Fields::Unit => Vec::new(),
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        "Describe can only be derived for structs with named fields",
                    ));
                }
            };
            struct_definition(&name, &fields, &params, rename)?
        }
        Data::Enum(data) => {
            if !params.is_empty() {
                return Err(syn::Error::new_spanned(
                    &input.generics,
                    "Describe does not support generic enums",
                ));
            }
            let mut variants = Vec::new();
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(syn::Error::new_spanned(
                        variant,
                        "Describe can only be derived for enums with unit variants",
                    ));
                }
                variants.push(rename.apply_to_variant(&variant.ident.to_string()));
            }
            let definition = quote! {
                ::specimen::schema::TypeDef::enumeration::<&str>(#name, [#(#variants),*])
            };
            (definition, Vec::new())
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "Describe cannot be derived for unions",
            ));
        }
    };

    let mut generics = input.generics.clone();
    for param in &params {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#param: ::specimen::Describe));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let type_expr = if params.is_empty() {
        quote! { ::specimen::TypeExpr::named(#name) }
    } else {
        quote! {
            ::specimen::TypeExpr::generic(
                #name,
                ::std::vec![#(<#params as ::specimen::Describe>::type_expr()),*],
            )
        }
    };

    Ok(quote! {
        impl #impl_generics ::specimen::Describe for #ident #ty_generics #where_clause {
            fn type_expr() -> ::specimen::TypeExpr {
                #type_expr
            }

            fn register(registry: &mut ::specimen::TypeRegistry) {
                if registry.contains(&::specimen::schema::TypeName::from(#name)) {
                    return;
                }
                registry.insert(#definition);
                #(#registrations)*
            }
        }
    })
}

/// Struct definition plus the `register` calls for each field type
fn struct_definition(
    name: &str,
    fields: &[&syn::Field],
    params: &[Ident],
    rename: RenameRule,
) -> syn::Result<(TokenStream2, Vec<TokenStream2>)> {
    let mut field_defs = Vec::new();
    let mut registrations = Vec::new();
    for field in fields {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_name = rename.apply_to_field(&field_ident.unraw().to_string());
        let template = template(&field.ty, params)?;
        let ty = &field.ty;
        field_defs.push(quote! {
            ::specimen::schema::FieldDef::new(#field_name, #template)
        });
        registrations.push(quote! {
            <#ty as ::specimen::Describe>::register(registry);
        });
    }

    let mut definition = quote! {
        ::specimen::schema::TypeDef::structure(#name, ::std::vec![#(#field_defs),*])
    };
    if !params.is_empty() {
        let param_names = params.iter().map(ToString::to_string);
        definition = quote! { #definition.with_params([#(#param_names),*]) };
    }
    Ok((definition, registrations))
}

/// Field type as written in the definition; generic parameters become `TypeExpr::Param`
fn template(ty: &Type, params: &[Ident]) -> syn::Result<TokenStream2> {
    if !mentions_param(ty.to_token_stream(), params) {
        return Ok(quote! { <#ty as ::specimen::Describe>::type_expr() });
    }

    match ty {
        Type::Path(TypePath { qself: None, path }) => {
            if let Some(ident) = path.get_ident() {
                if params.contains(ident) {
                    let param = ident.to_string();
                    return Ok(quote! { ::specimen::TypeExpr::param(#param) });
                }
            }
            let Some(segment) = path.segments.last() else {
                return Err(unsupported(ty));
            };
            let args: Vec<&Type> = match &segment.arguments {
                PathArguments::AngleBracketed(angle) => angle
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        GenericArgument::Type(arg) => Some(arg),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };

            let container = segment.ident.to_string();
            match (container.as_str(), args.as_slice()) {
                ("Vec" | "VecDeque", [element]) => {
                    let element = template(element, params)?;
                    Ok(quote! { ::specimen::TypeExpr::list(#element) })
                }
                ("HashSet" | "BTreeSet", [element, ..]) => {
                    let element = template(element, params)?;
                    Ok(quote! { ::specimen::TypeExpr::set(#element) })
                }
                ("HashMap" | "BTreeMap", [key, value, ..]) => {
                    let key = template(key, params)?;
                    let value = template(value, params)?;
                    Ok(quote! { ::specimen::TypeExpr::map(#key, #value) })
                }
                ("Option", [inner]) => {
                    let inner = template(inner, params)?;
                    Ok(quote! { ::specimen::TypeExpr::option(#inner) })
                }
                // Smart pointers are transparent
                ("Box" | "Rc" | "Arc", [inner]) => template(inner, params),
                (_, args) => {
                    let args = args
                        .iter()
                        .map(|arg| template(arg, params))
                        .collect::<syn::Result<Vec<_>>>()?;
                    Ok(quote! {
                        ::specimen::TypeExpr::generic(#container, ::std::vec![#(#args),*])
                    })
                }
            }
        }
        Type::Array(array) => {
            let element = template(&array.elem, params)?;
            let len = &array.len;
            Ok(quote! { ::specimen::TypeExpr::array(#element, #len) })
        }
        Type::Paren(paren) => template(&paren.elem, params),
        Type::Group(group) => template(&group.elem, params),
        _ => Err(unsupported(ty)),
    }
}

fn unsupported(ty: &Type) -> syn::Error {
    syn::Error::new_spanned(
        ty,
        "Describe supports generic parameters only inside paths and arrays",
    )
}

fn mentions_param(tokens: TokenStream2, params: &[Ident]) -> bool {
    tokens.into_iter().any(|token| match token {
        TokenTree::Ident(ident) => params.contains(&ident),
        TokenTree::Group(group) => mentions_param(group.stream(), params),
        TokenTree::Punct(_) | TokenTree::Literal(_) => false,
    })
}

/// Case conversion for generated names, spelled as in serde
#[derive(Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    None,
    Snake,
    Kebab,
    LowerCamel,
    ScreamingSnake,
    Lower,
    Upper,
}

impl RenameRule {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut rule = Self::None;
        for attr in attrs {
            if !attr.path().is_ident("describe") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let value: LitStr = meta.value()?.parse()?;
                    rule = Self::parse(&value)?;
                    Ok(())
                } else {
                    Err(meta.error("unsupported describe attribute"))
                }
            })?;
        }
        Ok(rule)
    }

    fn parse(value: &LitStr) -> syn::Result<Self> {
        match value.value().as_str() {
            "snake_case" => Ok(Self::Snake),
            "kebab-case" => Ok(Self::Kebab),
            "camelCase" => Ok(Self::LowerCamel),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            other => Err(syn::Error::new_spanned(
                value,
                format!("unknown rename_all rule `{other}`"),
            )),
        }
    }

    /// Field identifiers are already snake case
    fn apply_to_field(self, name: &str) -> String {
        match self {
            Self::None | Self::Snake | Self::Lower => name.to_string(),
            Self::Kebab => name.to_kebab_case(),
            Self::LowerCamel => name.to_lower_camel_case(),
            Self::ScreamingSnake | Self::Upper => name.to_uppercase(),
        }
    }

    fn apply_to_variant(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::Snake => name.to_snake_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::LowerCamel => name.to_lower_camel_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
        }
    }
}
