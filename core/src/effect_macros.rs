//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use order_detail_core::async_effect;
///
/// async_effect! {
///     let notes = repository.get_order_notes(local_id).await;
///     Some(OrderDetailAction::NotesLoaded { notes })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` that runs an async block for its side effect only
///
/// The block's value is discarded and nothing is fed back into the store.
///
/// # Example
///
/// ```rust,ignore
/// use order_detail_core::fire_and_forget;
///
/// fire_and_forget! {
///     events.emit(OrderDetailEvent::Snackbar(notice));
/// }
/// ```
#[macro_export]
macro_rules! fire_and_forget {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move {
                $($body)*
                None
            })
        )
    };
}
