//! List selection - a selected value kept valid against a list source

use std::marker::PhantomData;

use async_trait::async_trait;
use concord_core::{AuthorityId, CombinedInputs};
use concord_flow::{Reducer, Source};

use crate::{spawn_event, AuthorityConfig, AuthorityHandle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent<T> {
    /// Select a value, or clear the selection with `None`
    Select(Option<T>),
}

/// List source value; `None` while the list is unavailable
pub type ListValue<T> = Option<Vec<T>>;

pub type ListSelectionAuthority<T> = AuthorityHandle<SelectionEvent<T>, Option<T>>;

struct SelectionReducer<T> {
    list: AuthorityId,
    _value: PhantomData<fn() -> T>,
}

impl<T: PartialEq> SelectionReducer<T> {
    /// The selection survives only if the current list contains it
    fn validate(&self, selection: Option<T>, inputs: &CombinedInputs<ListValue<T>>) -> Option<T> {
        let list = inputs.get(self.list).and_then(Option::as_ref)?;
        selection.filter(|selected| list.contains(selected))
    }
}

#[async_trait]
impl<T> Reducer for SelectionReducer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Inputs = CombinedInputs<ListValue<T>>;
    type State = Option<T>;
    type Event = SelectionEvent<T>;
    type Output = Option<T>;

    async fn reduce_inputs(&self, state: Option<Option<T>>, inputs: &Self::Inputs) -> Option<T> {
        self.validate(state.flatten(), inputs)
    }

    async fn reduce_event(&self, _state: Option<T>, event: SelectionEvent<T>, inputs: &Self::Inputs) -> Option<T> {
        let SelectionEvent::Select(choice) = event;
        self.validate(choice, inputs)
    }

    async fn select(&self, state: &Option<T>, _inputs: &Self::Inputs) -> Option<T> {
        state.clone()
    }
}

/// Spawn a selection authority over one list source
pub fn spawn_list_selection<T>(list: Source<ListValue<T>>, config: AuthorityConfig) -> ListSelectionAuthority<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let reducer = SelectionReducer {
        list: list.id(),
        _value: PhantomData,
    };
    spawn_event(vec![list], reducer, config)
}

impl<T> AuthorityHandle<SelectionEvent<T>, Option<T>>
where
    T: Send + 'static,
{
    pub fn select(&self, value: Option<T>) {
        self.dispatch_event(SelectionEvent::Select(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer(list: AuthorityId) -> SelectionReducer<&'static str> {
        SelectionReducer {
            list,
            _value: PhantomData,
        }
    }

    fn inputs(list: AuthorityId, value: ListValue<&'static str>) -> CombinedInputs<ListValue<&'static str>> {
        [(list, value)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_select_member_of_list() {
        let id = AuthorityId::generate();
        let reducer = reducer(id);
        let current = inputs(id, Some(vec!["a", "b"]));

        let state = reducer.reduce_inputs(None, &current).await;
        assert_eq!(state, None);

        let state = reducer
            .reduce_event(state, SelectionEvent::Select(Some("b")), &current)
            .await;
        assert_eq!(reducer.select(&state, &current).await, Some("b"));

        // Not in the list
        let state = reducer
            .reduce_event(state, SelectionEvent::Select(Some("z")), &current)
            .await;
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_selection_follows_list() {
        let id = AuthorityId::generate();
        let reducer = reducer(id);

        let kept = reducer
            .reduce_inputs(Some(Some("a")), &inputs(id, Some(vec!["c", "a"])))
            .await;
        assert_eq!(kept, Some("a"));

        let removed = reducer
            .reduce_inputs(Some(kept), &inputs(id, Some(vec!["c"])))
            .await;
        assert_eq!(removed, None);

        let unavailable = reducer
            .reduce_inputs(Some(Some("c")), &inputs(id, None))
            .await;
        assert_eq!(unavailable, None);
    }
}
