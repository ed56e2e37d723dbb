use crate::config;
use crate::events::AppEvent;
use crate::gui::theme::{self, ThemeColors};
use crate::gui::wheel::{self, AddOutcome, OptionLabel, SpinStep, WheelState};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub struct AppModel {
    pub state: Rc<RefCell<WheelState>>,
    pub spinning: bool,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
    pub option_entry: gtk::Entry,
    pub options_list: gtk::ListBox,
}

#[derive(Debug)]
pub enum AppMsg {
    AddOption,
    RemoveOption(usize),
    Spin,
    SpinFinished(Option<OptionLabel>),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (WheelState, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Whirl"),
            set_resizable: false,
            add_css_class: "whirl-window",

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_top: 12,
                set_margin_bottom: 12,
                set_margin_start: 12,
                set_margin_end: 12,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_content_width: wheel::CANVAS_SIZE,
                    set_content_height: wheel::CANVAS_SIZE,
                    add_css_class: "wheel-canvas",
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 6,

                    #[name = "option_entry"]
                    gtk::Entry {
                        set_hexpand: true,
                        set_placeholder_text: Some("Add an option"),
                        connect_activate[sender] => move |_| {
                            sender.input(AppMsg::AddOption);
                        },
                    },

                    gtk::Button {
                        set_label: "Add",
                        connect_clicked[sender] => move |_| {
                            sender.input(AppMsg::AddOption);
                        },
                    },
                },

                gtk::ScrolledWindow {
                    set_min_content_height: 140,
                    set_vexpand: true,

                    #[name = "options_list"]
                    gtk::ListBox {
                        set_selection_mode: gtk::SelectionMode::None,
                        add_css_class: "options-list",
                    },
                },

                #[name = "spin_button"]
                gtk::Button {
                    set_label: "Spin",
                    add_css_class: "suggested-action",
                    #[watch]
                    set_sensitive: model.can_spin(),
                    connect_clicked[sender] => move |_| {
                        sender.input(AppMsg::Spin);
                    },
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, rx) = init;

        theme::load_css();

        let state = Rc::new(RefCell::new(state));

        let model = AppModel {
            state: state.clone(),
            spinning: false,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            option_entry: gtk::Entry::default(),
            options_list: gtk::ListBox::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.option_entry = widgets.option_entry.clone();
        model.options_list = widgets.options_list.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = wheel::draw(cr, &state_draw.borrow(), width, height, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        model.rebuild_options_list(&sender);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::AddOption => {
                let text = self.option_entry.text();
                let outcome = self.state.borrow_mut().registry.add(text.as_str());
                match outcome {
                    AddOutcome::Added => {
                        self.option_entry.set_text("");
                        self.rebuild_options_list(&sender);
                        self.drawing_area.queue_draw();
                    }
                    AddOutcome::EmptyLabel | AddOutcome::Duplicate => {
                        log::debug!("rejected option {:?}: {:?}", text.as_str(), outcome);
                    }
                }
            }
            AppMsg::RemoveOption(index) => {
                if self.state.borrow_mut().registry.remove_at(index).is_some() {
                    self.rebuild_options_list(&sender);
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Spin => {
                if !self.state.borrow_mut().begin_spin() {
                    return;
                }
                self.spinning = true;

                let state = self.state.clone();
                let sender = sender.clone();
                self.drawing_area.add_tick_callback(move |area, clock| {
                    let step = state.borrow_mut().step(clock.frame_time());
                    area.queue_draw();
                    match step {
                        SpinStep::Running => glib::ControlFlow::Continue,
                        SpinStep::Finished(winner) => {
                            sender.input(AppMsg::SpinFinished(winner));
                            glib::ControlFlow::Break
                        }
                        SpinStep::Idle => glib::ControlFlow::Break,
                    }
                });
            }
            AppMsg::SpinFinished(winner) => {
                self.spinning = false;
                match winner {
                    Some(label) => {
                        log::info!("the wheel landed on '{}'", label);
                        self.announce(&label);
                    }
                    None => log::warn!("spin finished with no options left"),
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.state.borrow_mut().apply_config(&new_config);
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn can_spin(&self) -> bool {
        !self.spinning && self.state.borrow().registry.len() >= 2
    }

    fn rebuild_options_list(&self, sender: &ComponentSender<Self>) {
        while let Some(row) = self.options_list.first_child() {
            self.options_list.remove(&row);
        }

        for (index, option) in self.state.borrow().registry.iter().enumerate() {
            let row = gtk::Box::new(gtk::Orientation::Horizontal, 6);

            let label = gtk::Label::new(Some(option.as_str()));
            label.set_hexpand(true);
            label.set_halign(gtk::Align::Start);
            row.append(&label);

            let remove = gtk::Button::from_icon_name("edit-delete-symbolic");
            remove.add_css_class("flat");
            let sender = sender.clone();
            remove.connect_clicked(move |_| {
                sender.input(AppMsg::RemoveOption(index));
            });
            row.append(&remove);

            self.options_list.append(&row);
        }
    }

    fn announce(&self, winner: &OptionLabel) {
        let dialog = gtk::AlertDialog::builder()
            .modal(true)
            .message("The wheel has spoken")
            .detail(winner.as_str())
            .build();
        dialog.show(Some(&self.root));
    }
}
