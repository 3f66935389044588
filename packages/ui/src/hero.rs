//! Landing hero: community name and what members get.

use dioxus::prelude::*;

use crate::Icon;
use crate::icons::{FaCode, FaRocket, FaTrophy, FaUsers};

pub const COMMUNITY_NAME: &str = "Pixel Plus Tech Community";

#[component]
pub fn Hero() -> Element {
    rsx! {
        section {
            class: "hero",
            h1 { class: "hero-title", "Welcome to the Future" }
            p {
                class: "hero-lede",
                "Join "
                span { class: "hero-accent", "{COMMUNITY_NAME}" }
                " and be part of an exclusive network of innovators, creators, and tech enthusiasts shaping tomorrow's technology."
            }

            div {
                class: "hero-features",
                Feature {
                    title: "Hands-on Workshops",
                    description: "Learn cutting-edge technologies with practical projects",
                    Icon { icon: FaCode, width: 28, height: 28 }
                }
                Feature {
                    title: "Tech Community",
                    description: "Connect with like-minded developers and innovators",
                    Icon { icon: FaUsers, width: 28, height: 28 }
                }
                Feature {
                    title: "Skill Building",
                    description: "Enhance your technical skills with expert guidance",
                    Icon { icon: FaTrophy, width: 28, height: 28 }
                }
                Feature {
                    title: "Innovation Hub",
                    description: "Be part of groundbreaking tech initiatives",
                    Icon { icon: FaRocket, width: 28, height: 28 }
                }
            }
        }
    }
}

#[component]
fn Feature(title: &'static str, description: &'static str, children: Element) -> Element {
    rsx! {
        div {
            class: "hero-feature",
            div { class: "hero-feature-icon", {children} }
            h3 { "{title}" }
            p { "{description}" }
        }
    }
}
