use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject
/// dependencies from a server running on a fresh in-memory datastore.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// `crate::model::store::Datastore`, in any order.
///
/// `#[backend_test(admin)]` logs the client in as the configured admin first;
/// `#[backend_test(voter)]` connects it as the voter `test-voter`.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin/voter if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! {
            let config = rocket_client.rocket().state::<crate::config::Config>().unwrap();
            let response = rocket_client
                .post("/auth/admin")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!({
                    "username": config.admin_username(),
                    "password": config.admin_password(),
                }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok, "admin login failed");
        },
        Some(arg) if arg == "voter" => quote! {
            let response = rocket_client
                .post("/voter/connect")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!({ "voter_id": "test-voter" }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok, "voter connect failed");
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or `voter`")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn __backend_test_setup() -> (rocket::local::asynchronous::Client, crate::model::store::Datastore) {
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::test_rocket())
                    .await
                    .unwrap();
                let store = rocket_client
                    .rocket()
                    .state::<crate::model::store::Datastore>()
                    .unwrap()
                    .clone();

                {
                    #maybe_login
                }

                (rocket_client, store)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                #[allow(unused_variables)]
                let (rocket_client, store) = __backend_test_setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_store = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself.
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "Datastore" {
                    if has_store {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `Datastore`",
                        ));
                    }
                    has_store = true;
                    args.push(quote! { store });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `store_ident: Datastore`",
        ));
    }

    Ok(args)
}
