mod document;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Document)]
// ============================================================================

/// Derive macro that implements `occ_repository::Document` for a struct.
///
/// The struct must carry a `DocumentMeta` field, flattened into the serialized
/// body so the store sees `id`, `version`, `created_at` and `updated_at` at
/// the top level.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Debug, Serialize, Deserialize, Document)]
/// #[document(collection = "invoices")]
/// struct Invoice {
///     #[serde(flatten)]
///     #[document(meta)]
///     pub meta: DocumentMeta,
///     pub total: i64,
/// }
/// ```
///
/// - `collection = "..."` defaults to the snake_case struct name plus `s`.
/// - The meta field is the one marked `#[document(meta)]`, or else the field
///   named `meta`.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
