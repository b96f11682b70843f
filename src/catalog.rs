//! Static read-only lists served by `/api/emotions` and `/api/tips`.

use crate::types::{Emotion, Tip};

pub const EMOTIONS: [Emotion; 7] = [
    Emotion { name: "Feliz", emoji: "😊" },
    Emotion { name: "Triste", emoji: "😢" },
    Emotion { name: "Enojado", emoji: "😠" },
    Emotion { name: "Ansioso", emoji: "😟" },
    Emotion { name: "Agradecido", emoji: "🙏" },
    Emotion { name: "Cansado", emoji: "😴" },
    Emotion { name: "Normal", emoji: "😐" },
];

pub const TIPS: [Tip; 10] = [
    Tip {
        texto: "La mayor riqueza es la salud mental. – Dalai Lama",
        imagen: "https://cdn.pixabay.com/photo/2017/08/01/08/29/people-2563491_1280.jpg",
    },
    Tip {
        texto: "Acepta tus emociones sin juzgarte.",
        imagen: "https://revistapersonae.com/wp-content/uploads/2023/10/Galeria_287_Psicologia_02.jpg",
    },
    Tip {
        texto: "Un mal día no define quién eres.",
        imagen: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcS7-R04TVOlEhq4Rv34t1imHtE0649Tl86QuNCpeH_4i1amIFdUbhALRQTww1QTgW4sBLc&usqp=CAU",
    },
    Tip {
        texto: "Haz una cosa a la vez. Está bien ir lento.",
        imagen: "https://olacoach.com/wp-content/uploads/2024/01/persevere-s-960x540-1.jpeg",
    },
    Tip {
        texto: "Está bien pedir ayuda. No tienes que enfrentarlo todo solo.",
        imagen: "https://blogger.googleusercontent.com/img/b/R29vZ2xl/AVvXsEhibBB-JcAIElLijvzNbnM4NAtwVQAdArXyBYqiLnV1yihRduQ4jgWUlrpNwAczkFuw-YeMVNDz2y30olxXAEBYMbO93sdutiAtmJrRF8MUkofUDVI537xdRWv8pQq9Ma4H5pErdKf1BmDj/s400/160114+Necesito+ayuda.jpg",
    },
    Tip {
        texto: "Cada día es una oportunidad para crecer",
        imagen: "https://images.unsplash.com/photo-1499209974431-9dddcece7f88?w=800",
    },
    Tip {
        texto: "La paz comienza con una sonrisa",
        imagen: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=800",
    },
    Tip {
        texto: "Respira profundo, todo estará bien",
        imagen: "https://images.unsplash.com/photo-1506126613408-eca07ce68773?w=800",
    },
    Tip {
        texto: "Eres más fuerte de lo que piensas",
        imagen: "https://images.unsplash.com/photo-1517836357463-d25dfeac3438?w=800",
    },
    Tip {
        texto: "Cultiva pensamientos positivos",
        imagen: "https://images.unsplash.com/photo-1499728603263-13726abce5fd?w=800",
    },
];

/// Look up an emotion by its display name
pub fn find_emotion(name: &str) -> Option<&'static Emotion> {
    EMOTIONS.iter().find(|e| e.name == name)
}
