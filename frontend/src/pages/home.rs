use crate::components::layout::Layout;
use leptos::ev::SubmitEvent;
use leptos::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u32,
    pub title: String,
    pub done: bool,
}

fn add_todo(items: &mut Vec<TodoItem>, next_id: &mut u32, title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    items.push(TodoItem {
        id: *next_id,
        title: title.to_string(),
        done: false,
    });
    *next_id += 1;
    true
}

fn toggle_todo(items: &mut [TodoItem], id: u32) {
    if let Some(item) = items.iter_mut().find(|item| item.id == id) {
        item.done = !item.done;
    }
}

fn clear_done(items: &mut Vec<TodoItem>) {
    items.retain(|item| !item.done);
}

#[component]
pub fn HomePage() -> impl IntoView {
    let items = create_rw_signal(Vec::<TodoItem>::new());
    let next_id = create_rw_signal(1u32);
    let (draft, set_draft) = create_signal(String::new());

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let title = draft.get_untracked();
        items.update(|list| {
            let mut id = next_id.get_untracked();
            if add_todo(list, &mut id, &title) {
                next_id.set(id);
                set_draft.set(String::new());
            }
        });
    };
    let on_clear_done = move |_| items.update(clear_done);

    view! {
        <Layout>
            <div class="bg-surface-elevated rounded-lg shadow p-6">
                <h2 class="text-lg font-semibold text-fg mb-4">"Todos"</h2>
                <form class="flex gap-2 mb-4" on:submit=handle_submit>
                    <input
                        type="text"
                        class="flex-1 border border-border rounded px-3 py-2"
                        placeholder="What needs doing?"
                        prop:value=draft
                        on:input=move |ev| set_draft.set(event_target_value(&ev))
                    />
                    <button
                        type="submit"
                        class="bg-action-primary-bg text-action-primary-fg px-4 py-2 rounded font-medium"
                    >
                        "Add"
                    </button>
                </form>
                <ul class="space-y-2">
                    <For each=move || items.get() key=|item| item.id let:item>
                        {
                            let id = item.id;
                            view! {
                                <li class="flex items-center gap-3">
                                    <input
                                        type="checkbox"
                                        prop:checked=item.done
                                        on:change=move |_| items.update(|list| toggle_todo(list, id))
                                    />
                                    <span class=move || {
                                        if items.get().iter().any(|i| i.id == id && i.done) {
                                            "line-through text-fg-muted"
                                        } else {
                                            "text-fg"
                                        }
                                    }>
                                        {item.title.clone()}
                                    </span>
                                </li>
                            }
                        }
                    </For>
                </ul>
                <Show when=move || items.get().iter().any(|item| item.done)>
                    <button
                        class="mt-4 text-sm text-fg-muted hover:text-fg"
                        on:click=on_clear_done
                    >
                        "Clear completed"
                    </button>
                </Show>
            </div>
        </Layout>
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::HomePage;
    use crate::state::notifications::provide_notifications;
    use crate::test_support::helpers::provide_authenticated;
    use crate::test_support::ssr::render_to_string;
    use leptos::*;

    #[test]
    fn home_page_renders_the_todo_panel() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_authenticated();
            view! { <HomePage /> }
        });
        assert!(html.contains("Todos"));
        assert!(html.contains("What needs doing?"));
    }
}
