//! Bridge component between Leptos and the imperative `zone_canvas::Engine`.
//!
//! ARCHITECTURE
//! ============
//! The engine owns zone state and drawing. This host loads the camera image,
//! forwards DOM input, reports `ZonesChanged` through `on_change` and mirrors
//! a [`ZoneEditorView`] into a signal for the side panel.
//!
//! Panel buttons push [`PanelCommand`]s into a signal instead of touching the
//! engine directly. One effect drains the queue against the engine.

use leptos::prelude::*;
use zone_canvas::doc::Zone;
#[cfg(feature = "hydrate")]
use zone_canvas::engine::{Action, Engine};

use crate::state::zone_editor::ZoneEditorView;
#[cfg(feature = "hydrate")]
use crate::util::canvas_input::{map_key, pointer_point, should_prevent_default_key};
#[cfg(feature = "hydrate")]
use crate::util::canvas_viewport::sync_viewport;
#[cfg(feature = "hydrate")]
use crate::util::image_loader::load_image;

#[cfg(feature = "hydrate")]
use std::cell::RefCell;
#[cfg(feature = "hydrate")]
use std::rc::Rc;

/// Side panel requests applied to the engine.
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
#[derive(Clone, Debug, PartialEq)]
enum PanelCommand {
    AddZone,
    ContinueDrawing,
    Finish,
    DeleteActive,
    Select(usize),
    Rename(usize, String),
}

#[cfg(feature = "hydrate")]
type EngineSlot = Rc<RefCell<Option<Engine>>>;

/// Redraw after matching the backing store to the container's current size.
#[cfg(feature = "hydrate")]
fn render(engine: &mut Engine, canvas_ref: &NodeRef<leptos::html::Canvas>) {
    sync_viewport(engine, canvas_ref);
    if let Err(err) = engine.render() {
        leptos::logging::warn!("zone editor render failed: {err:?}");
    }
}

#[cfg(feature = "hydrate")]
fn process_actions(
    actions: Vec<Action>,
    engine: &mut Engine,
    canvas_ref: &NodeRef<leptos::html::Canvas>,
    view_state: RwSignal<ZoneEditorView>,
    on_change: Callback<Vec<Zone>>,
) {
    let mut render_needed = false;
    for action in actions {
        match action {
            Action::ZonesChanged(zones) => on_change.run(zones),
            Action::RenderNeeded => render_needed = true,
        }
    }
    let next = ZoneEditorView::from_core(&engine.core);
    if view_state.with_untracked(|current| *current != next) {
        view_state.set(next);
    }
    if render_needed {
        render(engine, canvas_ref);
    }
}

#[cfg(feature = "hydrate")]
fn dispatch(
    slot: &EngineSlot,
    canvas_ref: &NodeRef<leptos::html::Canvas>,
    view_state: RwSignal<ZoneEditorView>,
    on_change: Callback<Vec<Zone>>,
    apply: impl FnOnce(&mut Engine) -> Vec<Action>,
) {
    let mut slot = slot.borrow_mut();
    let Some(engine) = slot.as_mut() else {
        return;
    };
    let actions = apply(engine);
    process_actions(actions, engine, canvas_ref, view_state, on_change);
}

#[cfg(feature = "hydrate")]
fn apply_command(engine: &mut Engine, command: PanelCommand) -> Vec<Action> {
    match command {
        PanelCommand::AddZone => engine.add_new_zone(),
        PanelCommand::ContinueDrawing => engine.begin_drawing(),
        PanelCommand::Finish => engine.finish_drawing(),
        PanelCommand::DeleteActive => match engine.active_zone() {
            Some(index) => engine.delete_zone(index),
            None => Vec::new(),
        },
        PanelCommand::Select(index) => engine.select_zone(index),
        PanelCommand::Rename(index, name) => engine.rename_zone(index, name),
    }
}

/// Polygon detection-zone editor over a camera snapshot.
///
/// `on_change` receives the full zone set after every edit that changed it.
/// Persisting it is the caller's job.
#[component]
pub fn ZoneEditor(
    #[prop(into)] image_url: Signal<String>,
    #[prop(optional)] initial_zones: Vec<Zone>,
    #[prop(optional)] read_only: bool,
    #[prop(into)] on_change: Callback<Vec<Zone>>,
) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let view_state = RwSignal::new(ZoneEditorView::default());
    let commands = RwSignal::new(Vec::<PanelCommand>::new());
    #[cfg(feature = "hydrate")]
    let engine: EngineSlot = Rc::new(RefCell::new(None));
    #[cfg(not(feature = "hydrate"))]
    {
        drop((image_url, initial_zones, on_change));
    }

    // Mount on first render, re-initialize whenever the image URL changes.
    #[cfg(feature = "hydrate")]
    {
        let engine = Rc::clone(&engine);
        let canvas_ref_mount = canvas_ref;
        Effect::new(move || {
            let url = image_url.get();
            let Some(canvas) = canvas_ref_mount.get() else {
                return;
            };
            {
                let mut slot = engine.borrow_mut();
                let zones = slot.as_ref().map_or_else(|| initial_zones.clone(), |e| e.zones().to_vec());
                let instance = slot.get_or_insert_with(|| Engine::new(canvas));
                instance.initialize(url.clone(), zones, read_only);
                view_state.set(ZoneEditorView::from_core(&instance.core));
                render(instance, &canvas_ref_mount);
            }

            let engine = Rc::clone(&engine);
            leptos::task::spawn_local(async move {
                let loaded = load_image(&url).await;
                let mut slot = engine.borrow_mut();
                let Some(instance) = slot.as_mut() else {
                    return;
                };
                if instance.core.image_url != url {
                    return;
                }
                let actions = match loaded {
                    Ok(image) => instance.image_ready(image),
                    Err(err) => {
                        leptos::logging::warn!("camera image failed to load ({url}): {err:?}");
                        instance.image_failed()
                    }
                };
                process_actions(actions, instance, &canvas_ref_mount, view_state, on_change);
            });
        });
    }

    // Window resizes bump a counter; the effect re-syncs and redraws.
    #[cfg(feature = "hydrate")]
    {
        let resize_tick = RwSignal::new(0_u64);
        let handle = window_event_listener(leptos::ev::resize, move |_| resize_tick.update(|n| *n += 1));
        on_cleanup(move || handle.remove());
        let engine = Rc::clone(&engine);
        Effect::new(move |previous: Option<u64>| {
            let tick = resize_tick.get();
            if previous.is_some_and(|p| p != tick) {
                if let Some(instance) = engine.borrow_mut().as_mut() {
                    render(instance, &canvas_ref);
                }
            }
            tick
        });
    }

    #[cfg(feature = "hydrate")]
    {
        let engine = Rc::clone(&engine);
        Effect::new(move || {
            commands.track();
            let queued = commands.try_update_untracked(std::mem::take).unwrap_or_default();
            for command in queued {
                dispatch(&engine, &canvas_ref, view_state, on_change, |e| apply_command(e, command));
            }
        });
    }

    let on_pointer_down = {
        #[cfg(feature = "hydrate")]
        {
            let engine = Rc::clone(&engine);
            move |ev: leptos::ev::PointerEvent| {
                ev.prevent_default();
                if let Some(canvas) = canvas_ref.get_untracked() {
                    if let Err(err) = canvas.focus() {
                        leptos::logging::warn!("zone editor focus failed: {err:?}");
                    }
                    if let Err(err) = canvas.set_pointer_capture(ev.pointer_id()) {
                        leptos::logging::warn!("zone editor pointer capture failed: {err:?}");
                    }
                }
                let point = pointer_point(&ev);
                dispatch(&engine, &canvas_ref, view_state, on_change, |e| {
                    sync_viewport(e, &canvas_ref);
                    e.on_pointer_down(point)
                });
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_move = {
        #[cfg(feature = "hydrate")]
        {
            let engine = Rc::clone(&engine);
            move |ev: leptos::ev::PointerEvent| {
                let point = pointer_point(&ev);
                dispatch(&engine, &canvas_ref, view_state, on_change, |e| e.on_pointer_move(point));
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_up = {
        #[cfg(feature = "hydrate")]
        {
            let engine = Rc::clone(&engine);
            move |ev: leptos::ev::PointerEvent| {
                if let Some(canvas) = canvas_ref.get_untracked() {
                    if canvas.has_pointer_capture(ev.pointer_id()) {
                        if let Err(err) = canvas.release_pointer_capture(ev.pointer_id()) {
                            leptos::logging::warn!("zone editor pointer release failed: {err:?}");
                        }
                    }
                }
                dispatch(&engine, &canvas_ref, view_state, on_change, Engine::on_pointer_up);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_leave = {
        #[cfg(feature = "hydrate")]
        {
            let engine = Rc::clone(&engine);
            move |_ev: leptos::ev::PointerEvent| {
                dispatch(&engine, &canvas_ref, view_state, on_change, Engine::on_pointer_leave);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_key_down = {
        #[cfg(feature = "hydrate")]
        {
            let engine = Rc::clone(&engine);
            move |ev: leptos::ev::KeyboardEvent| {
                let key = ev.key();
                if should_prevent_default_key(&key) {
                    ev.prevent_default();
                }
                let key = map_key(&key);
                dispatch(&engine, &canvas_ref, view_state, on_change, |e| e.on_key_down(&key));
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            move |_ev: leptos::ev::KeyboardEvent| {}
        }
    };

    let push = move |command: PanelCommand| commands.update(|queue| queue.push(command));

    view! {
        <div class="zone-editor" class:zone-editor--read-only=read_only>
            <canvas
                class="zone-editor__canvas"
                node_ref=canvas_ref
                tabindex="0"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointerleave=on_pointer_leave
                on:keydown=on_key_down
            >
                "Your browser does not support canvas."
            </canvas>
            <div class="zone-editor__panel">
                <p class="zone-editor__hint">{move || view_state.get().hint()}</p>
                <div class="zone-editor__actions" class:hidden=read_only>
                    <button
                        class="btn"
                        disabled=move || !view_state.get().editable
                        on:click=move |_| push(PanelCommand::AddZone)
                    >
                        "Add zone"
                    </button>
                    <button
                        class="btn"
                        disabled=move || !view_state.get().can_continue()
                        on:click=move |_| push(PanelCommand::ContinueDrawing)
                    >
                        "Continue drawing"
                    </button>
                    <button
                        class="btn btn--primary"
                        disabled=move || !view_state.get().can_finish()
                        on:click=move |_| push(PanelCommand::Finish)
                    >
                        "Finish"
                    </button>
                    <button
                        class="btn btn--danger"
                        disabled=move || !view_state.get().can_delete_zone()
                        on:click=move |_| push(PanelCommand::DeleteActive)
                    >
                        "Delete zone"
                    </button>
                </div>
                <ul class="zone-editor__zones">
                    <For
                        each=move || view_state.get().zones.into_iter().enumerate()
                        key=|(index, zone)| (zone.id.clone(), zone.name.clone(), zone.point_count, *index)
                        children=move |(index, zone)| {
                            let active = move || view_state.get().active_zone == Some(index);
                            view! {
                                <li class="zone-editor__zone" class:zone-editor__zone--active=active>
                                    <button class="zone-editor__zone-select" on:click=move |_| push(PanelCommand::Select(index))>
                                        {format!("{} ({} points)", zone.name, zone.point_count)}
                                    </button>
                                    <input
                                        class="zone-editor__zone-name"
                                        type="text"
                                        prop:value=zone.name.clone()
                                        disabled=move || !view_state.get().editable
                                        on:change=move |ev| push(PanelCommand::Rename(index, event_target_value(&ev)))
                                    />
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
        </div>
    }
}
