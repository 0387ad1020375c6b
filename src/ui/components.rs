/// Reusable UI components

use yew::prelude::*;

use crate::tab_data::GroupSummary;

#[derive(Properties, PartialEq)]
pub struct ToggleSwitchProps {
    pub label: AttrValue,
    pub checked: bool,
    pub onchange: Callback<bool>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(ToggleSwitch)]
pub fn toggle_switch(props: &ToggleSwitchProps) -> Html {
    let onclick = {
        let onchange = props.onchange.clone();
        let checked = props.checked;
        let disabled = props.disabled;
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if !disabled {
                onchange.emit(!checked);
            }
        })
    };

    html! {
        <div class="toggle-row">
            <span class="toggle-label">{props.label.clone()}</span>
            <div class={classes!("toggle", props.checked.then_some("active"))} {onclick}></div>
            <span class="toggle-status">{if props.checked { "On" } else { "Off" }}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupListProps {
    pub groups: Vec<GroupSummary>,
}

#[function_component(GroupList)]
pub fn group_list(props: &GroupListProps) -> Html {
    if props.groups.is_empty() {
        return html! { <div class="no-groups">{"No groups yet"}</div> };
    }

    html! {
        <div class="groups-list">
            {for props.groups.iter().map(|group| html! {
                <div class="group-item" key={group.id}>
                    <span
                        class="group-color"
                        style={format!("background-color: var(--group-{}, #666);", group.color)}
                    ></span>
                    <span class="group-name">{&group.title}</span>
                    <span class="group-count">{group.tab_count()}</span>
                </div>
            })}
        </div>
    }
}
