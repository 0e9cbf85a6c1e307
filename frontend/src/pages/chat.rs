use crate::components::layout::Layout;
use leptos::*;

#[component]
pub fn ChatPage() -> impl IntoView {
    view! {
        <Layout>
            <div class="bg-surface-elevated rounded-lg shadow p-6">
                <h2 class="text-lg font-semibold text-fg mb-2">"Chat"</h2>
                <p class="text-sm text-fg-muted">
                    "Team chat is not available yet. Your session keeps running while you are here."
                </p>
            </div>
        </Layout>
    }
}
